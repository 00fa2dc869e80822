//! Trigger sources and dispatch.
//!
//! Four independent trigger sources feed one dispatcher:
//!
//! ```text
//! hotkey thread ─┐
//! tray thread  ──┼──▶ TriggerEvent (mpsc) ──▶ Dispatcher ──┬─▶ UiCommand::OpenPrompt
//! prompt window ─┘                                          └─▶ RunQueue::submit
//! ```
//!
//! Each source only ever sends into the channel, so a slow or failed source
//! never affects the others.  The action selected by a trigger travels
//! inside the event (and inside `OpenPrompt` for the two prompt-based
//! actions) — there is no shared mode variable to race on, and the prompt
//! surface keeps only the most recent pending action, so the last trigger
//! wins.

pub mod dispatcher;
pub mod hotkeys;
pub mod tray;

pub use dispatcher::Dispatcher;
pub use hotkeys::{bindings_from_config, parse_chord, Chord, HotkeyListener};
pub use tray::TrayMenu;

use crate::actions::Action;

// ---------------------------------------------------------------------------
// TriggerEvent
// ---------------------------------------------------------------------------

/// Events flowing from any trigger source into the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// A hotkey chord or tray item fired.
    Activated(Action),
    /// The prompt window's confirm key fired with the entered text.
    PromptConfirmed { action: Action, text: String },
}

// ---------------------------------------------------------------------------
// UiCommand
// ---------------------------------------------------------------------------

/// Commands sent from the dispatcher (and the tray) to the prompt window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    /// Reveal the prompt surface to collect input for the given action.
    OpenPrompt(Action),
    /// Shut the application down (tray Quit item).
    Quit,
}
