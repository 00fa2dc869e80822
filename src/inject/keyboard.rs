//! Keyboard simulation backed by the `enigo` crate.
//!
//! Provides [`KeyboardSink`], the production [`KeystrokeSink`], and
//! [`capture_selection`], which sends select-all + cut to the focused window
//! so its content lands on the clipboard:
//!
//! | Platform | Chord |
//! |----------|-------|
//! | macOS    | ⌘A, ⌘X |
//! | Windows  | Ctrl+A, Ctrl+X |
//! | Linux    | Ctrl+A, Ctrl+X |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{InjectError, KeystrokeSink};

// ---------------------------------------------------------------------------
// KeyboardSink
// ---------------------------------------------------------------------------

/// Types characters into the focused window via enigo.
///
/// A new [`Enigo`] instance is created for each call because `Enigo` is not
/// `Send` and the handle is cheap to construct.
#[derive(Debug, Clone, Default)]
pub struct KeyboardSink;

impl KeyboardSink {
    pub fn new() -> Self {
        Self
    }
}

impl KeystrokeSink for KeyboardSink {
    /// Emit `c` as text input into the focused window.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::KeySimulation`] if the enigo backend cannot be
    /// initialised or the event fails to be delivered.
    fn type_char(&self, c: char) -> Result<(), InjectError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

        let mut buf = [0u8; 4];
        enigo
            .text(c.encode_utf8(&mut buf))
            .map_err(|e| InjectError::KeySimulation(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// capture_selection
// ---------------------------------------------------------------------------

/// Simulate select-all followed by cut in the currently focused window.
///
/// Used before clipboard-based actions so that the focused field's full
/// content becomes the clipboard snapshot the handler reads.  Callers should
/// allow a short settle delay afterwards before reading the clipboard.
///
/// # Errors
///
/// Returns [`InjectError::KeySimulation`] if the enigo backend cannot be
/// initialised or if any key event fails to be delivered.
pub fn capture_selection() -> Result<(), InjectError> {
    let mut enigo = Enigo::new(&Settings::default())
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

    #[cfg(target_os = "macos")]
    let modifier = Key::Meta;
    #[cfg(not(target_os = "macos"))]
    let modifier = Key::Control;

    enigo
        .key(modifier, Direction::Press)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    enigo
        .key(Key::Unicode('a'), Direction::Click)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    enigo
        .key(Key::Unicode('x'), Direction::Click)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    enigo
        .key(modifier, Direction::Release)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

    Ok(())
}
