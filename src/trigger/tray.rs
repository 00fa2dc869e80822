//! System tray icon and menu.
//!
//! The tray mirrors the four hotkey actions and adds Quit.  `tray-icon`
//! delivers menu activations on a global crossbeam channel; a dedicated
//! polling thread maps them to [`TriggerEvent`]s so the tray behaves like
//! any other trigger source.  Tray construction failure is logged and
//! tolerated — hotkeys and the prompt window keep working without it.

use anyhow::Result;
use tokio::sync::mpsc;
use tray_icon::{
    menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};

use crate::actions::Action;
use crate::trigger::{TriggerEvent, UiCommand};

// ---------------------------------------------------------------------------
// TrayMenu
// ---------------------------------------------------------------------------

/// Handle keeping the tray icon alive.
///
/// Dropping it removes the icon; keep it in scope for the process lifetime.
pub struct TrayMenu {
    _tray: TrayIcon,
}

impl TrayMenu {
    /// Build the tray icon and spawn the menu-event forwarding thread.
    ///
    /// * `trigger_tx` — receives an [`TriggerEvent::Activated`] per action
    ///   item.
    /// * `ui_tx` — receives [`UiCommand::Quit`] for the Quit item.
    pub fn build(
        trigger_tx: mpsc::Sender<TriggerEvent>,
        ui_tx: mpsc::Sender<UiCommand>,
    ) -> Result<Self> {
        let menu = Menu::new();

        let actions = [
            Action::Ask,
            Action::TranslateTo,
            Action::Translate,
            Action::Grammar,
        ];

        let mut action_ids: Vec<(MenuId, Action)> = Vec::with_capacity(actions.len());
        for action in actions {
            let item = MenuItem::new(action.menu_label(), true, None);
            action_ids.push((item.id().clone(), action));
            menu.append(&item)?;
        }

        menu.append(&PredefinedMenuItem::separator())?;
        let quit_item = MenuItem::new("Quit", true, None);
        let quit_id = quit_item.id().clone();
        menu.append(&quit_item)?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("quickgpt")
            .with_icon(icon()?)
            .build()?;

        log::info!("tray: menu initialised");

        // Forwarding thread: lives for the process lifetime, like the hotkey
        // listener thread.
        std::thread::Builder::new()
            .name("tray-menu".into())
            .spawn(move || {
                let rx = MenuEvent::receiver();
                while let Ok(event) = rx.recv() {
                    if event.id == quit_id {
                        log::info!("tray: quit");
                        let _ = ui_tx.blocking_send(UiCommand::Quit);
                        continue;
                    }

                    if let Some((_, action)) =
                        action_ids.iter().find(|(id, _)| *id == event.id)
                    {
                        let _ = trigger_tx.blocking_send(TriggerEvent::Activated(*action));
                    }
                }
            })
            .expect("failed to spawn tray-menu thread");

        Ok(Self { _tray: tray })
    }
}

// ---------------------------------------------------------------------------
// Icon
// ---------------------------------------------------------------------------

/// Programmatic tray icon: a filled accent-coloured disc with a soft edge.
fn icon() -> Result<tray_icon::Icon> {
    const SIZE: u32 = 32;
    let center = SIZE as f32 / 2.0;
    let radius = center - 1.0;

    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            if dist <= radius {
                // Soft edge anti-aliasing over the outer 1.5 px.
                let alpha = if dist > radius - 1.5 {
                    ((radius - dist) / 1.5 * 255.0) as u8
                } else {
                    255
                };
                rgba.extend_from_slice(&[92, 128, 246, alpha]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }

    Ok(tray_icon::Icon::from_rgba(rgba, SIZE, SIZE)?)
}
