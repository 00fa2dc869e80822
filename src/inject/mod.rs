//! Synthetic input module — keystroke injection and clipboard access.
//!
//! # Overview
//!
//! Generated text is delivered by typing it into whatever window currently
//! has keyboard focus, one character at a time, exactly as if the user were
//! typing.  The pacing between characters lives in the pipeline runner; this
//! module only knows how to emit a single character ([`KeystrokeSink`]) and
//! how to snapshot the clipboard ([`ClipboardReader`]).
//!
//! Both capabilities are traits so the pipeline and dispatcher can be tested
//! against recording doubles without touching the OS input layer.

pub mod clipboard;
pub mod keyboard;

pub use clipboard::SystemClipboard;
pub use keyboard::{capture_selection, KeyboardSink};

use thiserror::Error;

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// All errors that can surface from the OS input layer.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// KeystrokeSink
// ---------------------------------------------------------------------------

/// Emits a single character as synthetic keyboard input into the focused
/// window.
///
/// Implementors must be `Send + Sync`; the pipeline calls `type_char` from
/// `spawn_blocking` one character at a time, so calls never overlap within a
/// run.
pub trait KeystrokeSink: Send + Sync {
    fn type_char(&self, c: char) -> Result<(), InjectError>;
}

// ---------------------------------------------------------------------------
// ClipboardReader
// ---------------------------------------------------------------------------

/// Snapshot read of the system clipboard's plain-text content.
///
/// An empty or non-text clipboard reads as an empty string rather than an
/// error.
pub trait ClipboardReader: Send + Sync {
    fn read_text(&self) -> Result<String, InjectError>;
}
