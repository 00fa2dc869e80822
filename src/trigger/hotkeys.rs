//! Global hotkey listening, backed by `rdev`.
//!
//! # Design
//!
//! `rdev::listen()` is a blocking OS-level call that never returns while the
//! process is alive.  It must run on a **dedicated OS thread** — it cannot
//! be used inside a tokio task.  One thread watches all bound chords and
//! forwards matches into the trigger channel with `blocking_send`.
//!
//! Binding registration happens per chord: a chord string that cannot be
//! parsed is logged and skipped, disabling only that one action's hotkey —
//! the remaining chords and the tray menu keep working.  If the OS event
//! hook itself fails, hotkeys as a whole are lost but the rest of the
//! application continues.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has no graceful shutdown API.  Dropping the
//! [`HotkeyListener`] sets a stop flag so the callback silently discards
//! further events; the OS thread itself remains blocked in the rdev event
//! loop until the process exits, which holds no resources needing cleanup.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use crate::actions::Action;
use crate::config::HotkeyConfig;
use crate::trigger::TriggerEvent;

// ---------------------------------------------------------------------------
// Chord
// ---------------------------------------------------------------------------

/// A parsed hotkey chord: one non-modifier key plus an exact modifier set.
///
/// `Ctrl+F8` only fires while Control is held and Shift/Alt/Meta are not —
/// modifiers are matched exactly so `F8` and `Ctrl+F8` can coexist as
/// distinct bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub key: rdev::Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Chord {
    fn bare(key: rdev::Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }
}

// ---------------------------------------------------------------------------
// parse_chord
// ---------------------------------------------------------------------------

/// Parse a chord string like `"F9"`, `"Ctrl+F8"` or `"Ctrl+Shift+T"`.
///
/// Modifier names: `Ctrl`/`Control`, `Shift`, `Alt`/`Option`,
/// `Meta`/`Cmd`/`Super`/`Win`.  Exactly one non-modifier key is required.
/// Returns `None` for unrecognised keys, duplicate keys, or modifier-only
/// chords so callers can treat the chord as a failed registration.
pub fn parse_chord(chord: &str) -> Option<Chord> {
    let mut parsed: Option<Chord> = None;
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut meta = false;

    for part in chord.split('+') {
        match part.trim() {
            "Ctrl" | "Control" => ctrl = true,
            "Shift" => shift = true,
            "Alt" | "Option" => alt = true,
            "Meta" | "Cmd" | "Super" | "Win" => meta = true,
            name => {
                if parsed.is_some() {
                    return None; // two non-modifier keys
                }
                parsed = Some(Chord::bare(parse_key(name)?));
            }
        }
    }

    let mut chord = parsed?;
    chord.ctrl = ctrl;
    chord.shift = shift;
    chord.alt = alt;
    chord.meta = meta;
    Some(chord)
}

/// Parse a single non-modifier key name into an [`rdev::Key`].
///
/// Supports F1–F12, digits, letters (case-insensitive) and common named
/// keys.  Returns `None` for unrecognised names.
fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key;

    let key = match name {
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,

        "Escape" | "Esc" => Key::Escape,
        "Space" => Key::Space,
        "Return" | "Enter" => Key::Return,
        "Tab" => Key::Tab,
        "Home" => Key::Home,
        "End" => Key::End,
        "PageUp" => Key::PageUp,
        "PageDown" => Key::PageDown,

        "0" => Key::Num0,
        "1" => Key::Num1,
        "2" => Key::Num2,
        "3" => Key::Num3,
        "4" => Key::Num4,
        "5" => Key::Num5,
        "6" => Key::Num6,
        "7" => Key::Num7,
        "8" => Key::Num8,
        "9" => Key::Num9,

        letter => {
            let mut chars = letter.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            match c.to_ascii_uppercase() {
                'A' => Key::KeyA,
                'B' => Key::KeyB,
                'C' => Key::KeyC,
                'D' => Key::KeyD,
                'E' => Key::KeyE,
                'F' => Key::KeyF,
                'G' => Key::KeyG,
                'H' => Key::KeyH,
                'I' => Key::KeyI,
                'J' => Key::KeyJ,
                'K' => Key::KeyK,
                'L' => Key::KeyL,
                'M' => Key::KeyM,
                'N' => Key::KeyN,
                'O' => Key::KeyO,
                'P' => Key::KeyP,
                'Q' => Key::KeyQ,
                'R' => Key::KeyR,
                'S' => Key::KeyS,
                'T' => Key::KeyT,
                'U' => Key::KeyU,
                'V' => Key::KeyV,
                'W' => Key::KeyW,
                'X' => Key::KeyX,
                'Y' => Key::KeyY,
                'Z' => Key::KeyZ,
                _ => return None,
            }
        }
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// bindings_from_config
// ---------------------------------------------------------------------------

/// Parse the configured chords into `(Chord, Action)` bindings.
///
/// A chord that fails to parse is a registration failure for that binding
/// only: it is logged and skipped while every other binding (and the tray
/// menu) stays functional.
pub fn bindings_from_config(config: &HotkeyConfig) -> Vec<(Chord, Action)> {
    let wanted = [
        (config.ask.as_str(), Action::Ask),
        (config.translate_to.as_str(), Action::TranslateTo),
        (config.translate.as_str(), Action::Translate),
        (config.grammar.as_str(), Action::Grammar),
    ];

    let mut bindings = Vec::with_capacity(wanted.len());
    for (chord, action) in wanted {
        match parse_chord(chord) {
            Some(parsed) => bindings.push((parsed, action)),
            None => log::error!(
                "hotkey: cannot bind {:?} for {} — this shortcut is disabled",
                chord,
                action.menu_label()
            ),
        }
    }
    bindings
}

// ---------------------------------------------------------------------------
// Modifier tracking
// ---------------------------------------------------------------------------

/// Currently held modifier keys, tracked from raw press/release events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Modifiers {
    ctrl: bool,
    shift: bool,
    alt: bool,
    meta: bool,
}

impl Modifiers {
    /// Record a modifier press/release.  Returns `true` when the event was a
    /// modifier key (and therefore cannot complete a chord itself).
    fn apply(&mut self, event: &rdev::EventType) -> bool {
        use rdev::{EventType, Key};

        let (key, down) = match event {
            EventType::KeyPress(k) => (k, true),
            EventType::KeyRelease(k) => (k, false),
            _ => return false,
        };

        match key {
            Key::ControlLeft | Key::ControlRight => self.ctrl = down,
            Key::ShiftLeft | Key::ShiftRight => self.shift = down,
            Key::Alt | Key::AltGr => self.alt = down,
            Key::MetaLeft | Key::MetaRight => self.meta = down,
            _ => return false,
        }
        true
    }
}

/// Find the action bound to `key` under the exact modifier set `mods`.
fn match_binding(bindings: &[(Chord, Action)], key: rdev::Key, mods: Modifiers) -> Option<Action> {
    bindings
        .iter()
        .find(|(chord, _)| {
            chord.key == key
                && chord.ctrl == mods.ctrl
                && chord.shift == mods.shift
                && chord.alt == mods.alt
                && chord.meta == mods.meta
        })
        .map(|(_, action)| *action)
}

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

/// Handle to the running hotkey listener thread.
///
/// Construct with [`HotkeyListener::start`].  Drop it to stop forwarding
/// events (the OS thread persists until process exit, see the module docs).
pub struct HotkeyListener {
    /// Shared stop flag — set `true` on [`Drop`].
    stop: Arc<AtomicBool>,
    /// Kept so the thread is not detached prematurely; never joined because
    /// `rdev::listen` never returns.
    _thread: Option<std::thread::JoinHandle<()>>,
}

impl HotkeyListener {
    /// Spawn the dedicated OS thread that watches `bindings` and forwards a
    /// [`TriggerEvent::Activated`] on `tx` whenever a bound chord is pressed.
    ///
    /// With no bindings (every chord failed to parse) no thread is spawned —
    /// the tray menu remains the only trigger source.
    pub fn start(bindings: Vec<(Chord, Action)>, tx: mpsc::Sender<TriggerEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));

        if bindings.is_empty() {
            log::warn!("hotkey: no usable chords — global shortcuts disabled");
            return Self {
                stop,
                _thread: None,
            };
        }

        let stop_clone = Arc::clone(&stop);
        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut mods = Modifiers::default();

                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }

                    if mods.apply(&event.event_type) {
                        return;
                    }

                    if let rdev::EventType::KeyPress(key) = event.event_type {
                        if let Some(action) = match_binding(&bindings, key, mods) {
                            // blocking_send is safe from a non-async thread.
                            let _ = tx.blocking_send(TriggerEvent::Activated(action));
                        }
                    }
                });

                // Fatal to hotkeys only: the tray and prompt keep working.
                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                }
            })
            .expect("failed to spawn hotkey-listener thread");

        Self {
            stop,
            _thread: Some(thread),
        }
    }
}

impl Drop for HotkeyListener {
    /// Set the stop flag so the rdev callback stops forwarding events.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
