//! Clipboard snapshot reads backed by the `arboard` crate.
//!
//! A short-lived [`arboard::Clipboard`] handle is created per call rather
//! than shared, because `arboard::Clipboard` is not `Send` on all platforms
//! and the handle is cheap to create.

use arboard::Clipboard;

use super::{ClipboardReader, InjectError};

// ---------------------------------------------------------------------------
// SystemClipboard
// ---------------------------------------------------------------------------

/// Production [`ClipboardReader`] over the OS clipboard.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardReader for SystemClipboard {
    /// Snapshot the clipboard's plain-text content.
    ///
    /// An empty clipboard or non-text content (e.g. an image) reads as an
    /// empty string — only a failure to open the clipboard itself is an
    /// error.
    fn read_text(&self) -> Result<String, InjectError> {
        let mut clipboard =
            Clipboard::new().map_err(|e| InjectError::ClipboardAccess(e.to_string()))?;
        Ok(clipboard.get_text().unwrap_or_default())
    }
}
