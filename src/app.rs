//! Prompt window — egui/eframe single-line modal entry.
//!
//! # Architecture
//!
//! [`PromptApp`] is the top-level [`eframe::App`].  It owns two channel
//! endpoints:
//!
//! * `ui_rx` — receives [`UiCommand`]s from the dispatcher and the tray
//!   (open the prompt for an action, quit).
//! * `trigger_tx` — sends [`TriggerEvent::PromptConfirmed`] back into the
//!   dispatcher when the user confirms.
//!
//! The window spends most of its life hidden; `update` keeps running on a
//! slow repaint tick so the command channel is polled even while invisible.
//!
//! # Key handling
//!
//! Only Enter confirms.  Backspace, Delete and every other editing key are
//! handled by the text edit itself and never dispatch, and Escape dismisses
//! without dispatching.  A window close request hides the prompt instead of
//! quitting — the application lives in the tray until its Quit item is used.
//!
//! # Pending action
//!
//! The action that opened the prompt rides along in `OpenPrompt` and is held
//! only until confirm or dismiss.  A second trigger while the prompt is open
//! simply replaces it (and clears the text): last trigger wins.

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::actions::Action;
use crate::trigger::{TriggerEvent, UiCommand};

// ---------------------------------------------------------------------------
// PromptApp
// ---------------------------------------------------------------------------

/// eframe application — the floating prompt entry.
pub struct PromptApp {
    /// Action awaiting input; `None` while the prompt is idle.
    pending: Option<Action>,
    /// Current contents of the text entry.
    text: String,
    /// Whether the prompt surface is currently shown.
    visible: bool,
    /// Set when the entry should grab focus on the next frame.
    focus_requested: bool,
    /// True once Quit was requested; lets the close request through.
    quitting: bool,

    /// Receive commands from the dispatcher / tray.
    ui_rx: mpsc::Receiver<UiCommand>,
    /// Send confirm events back to the dispatcher.
    trigger_tx: mpsc::Sender<TriggerEvent>,
}

impl PromptApp {
    pub fn new(ui_rx: mpsc::Receiver<UiCommand>, trigger_tx: mpsc::Sender<TriggerEvent>) -> Self {
        Self {
            pending: None,
            text: String::new(),
            visible: false,
            focus_requested: false,
            quitting: false,
            ui_rx,
            trigger_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Channel polling
    // -----------------------------------------------------------------------

    /// Drain all pending UI commands (non-blocking).
    fn poll_commands(&mut self, ctx: &egui::Context) {
        while let Ok(cmd) = self.ui_rx.try_recv() {
            match cmd {
                UiCommand::OpenPrompt(action) => self.open(action, ctx),
                UiCommand::Quit => {
                    self.quitting = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Show / confirm / dismiss
    // -----------------------------------------------------------------------

    /// Reveal the entry for `action`: clear prior text, retitle, focus.
    fn open(&mut self, action: Action, ctx: &egui::Context) {
        self.pending = Some(action); // last trigger wins
        self.text.clear();
        self.visible = true;
        self.focus_requested = true;

        if let Some(title) = action.prompt_title() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.into()));
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    }

    /// Dispatch the entered text for the pending action, then hide.
    fn confirm(&mut self, ctx: &egui::Context) {
        if let Some(action) = self.pending.take() {
            let text = std::mem::take(&mut self.text);
            let event = TriggerEvent::PromptConfirmed { action, text };
            if self.trigger_tx.try_send(event).is_err() {
                log::error!("prompt: dispatcher is gone — input dropped");
            }
        }
        self.hide(ctx);
    }

    /// Hide without dispatching.
    fn hide(&mut self, ctx: &egui::Context) {
        self.visible = false;
        self.text.clear();
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for PromptApp {
    /// Called every frame by eframe.  Polls the command channel, then
    /// renders the entry while visible.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_commands(ctx);

        // Keep polling the command channel while hidden / idle.
        ctx.request_repaint_after(Duration::from_millis(100));

        // Close button / Cmd-W hides the prompt; only tray Quit closes.
        if ctx.input(|i| i.viewport().close_requested()) && !self.quitting {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.pending = None;
            self.hide(ctx);
        }

        if !self.visible {
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.add_sized(
                [ui.available_width(), 28.0],
                egui::TextEdit::singleline(&mut self.text).hint_text("Type here..."),
            );

            if self.focus_requested {
                response.request_focus();
                self.focus_requested = false;
            }

            // Enter confirms; editing keys stay inside the text edit.
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.confirm(ctx);
            } else if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.pending = None;
                self.hide(ctx);
            }
        });
    }
}
