//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the streaming completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the API endpoint.
    ///
    /// Any provider speaking the OpenAI chat-completions wire format works
    /// (OpenAI, Groq, LM Studio, vLLM, Ollama in OpenAI mode …).
    pub base_url: String,
    /// API key.  `None` falls back to the `OPENAI_API_KEY` environment
    /// variable; an empty key sends no `Authorization` header at all.
    pub api_key: Option<String>,
    /// Model used for the Fast tier (Ask, Grammar).
    pub fast_model: String,
    /// Model used for the Capable tier (Translate, Translate To).
    pub capable_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            fast_model: "gpt-3.5-turbo".into(),
            capable_model: "gpt-4".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey chords, one per action.
///
/// Chord strings are parsed by [`crate::trigger::parse_chord`]; a chord that
/// fails to parse disables that one binding and is logged at startup — the
/// remaining bindings and the tray menu keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Chord that opens the question prompt (e.g. `"F9"`).
    pub ask: String,
    /// Chord that opens the target-language prompt.
    pub translate_to: String,
    /// Chord that translates the clipboard into the reference language.
    pub translate: String,
    /// Chord that fixes grammar/spelling of the clipboard
    /// (e.g. `"Ctrl+F8"`).
    pub grammar: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            ask: "F9".into(),
            translate_to: "F7".into(),
            translate: "F8".into(),
            grammar: "Ctrl+F8".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// InjectConfig
// ---------------------------------------------------------------------------

/// Settings for synthetic keystroke output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectConfig {
    /// Milliseconds between characters for Fast-tier output (Ask, Grammar).
    pub fast_char_delay_ms: u64,
    /// Milliseconds between characters for Capable-tier output (translation).
    pub capable_char_delay_ms: u64,
    /// Replacement for newlines inside stream fragments, so mid-stream line
    /// breaks never leave the target input field.
    pub newline_replacement: String,
    /// Emit select-all + cut before clipboard-based actions (Translate To,
    /// Grammar) so the focused field's content becomes the input text.
    pub capture_selection: bool,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            fast_char_delay_ms: 10,
            capable_char_delay_ms: 30,
            newline_replacement: " ".into(),
            capture_selection: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslateConfig
// ---------------------------------------------------------------------------

/// Settings for the fixed-target Translate action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Language the plain Translate action translates into, and the language
    /// named by the "already in …" marker reply.
    pub reference_language: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            reference_language: "English".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion endpoint settings.
    pub llm: LlmConfig,
    /// Global hotkey chords.
    pub hotkey: HotkeyConfig,
    /// Keystroke output settings.
    pub inject: InjectConfig,
    /// Translate action settings.
    pub translate: TranslateConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            hotkey: HotkeyConfig::default(),
            inject: InjectConfig::default(),
            translate: TranslateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        // LlmConfig
        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.fast_model, loaded.llm.fast_model);
        assert_eq!(original.llm.capable_model, loaded.llm.capable_model);

        // HotkeyConfig
        assert_eq!(original.hotkey.ask, loaded.hotkey.ask);
        assert_eq!(original.hotkey.translate_to, loaded.hotkey.translate_to);
        assert_eq!(original.hotkey.translate, loaded.hotkey.translate);
        assert_eq!(original.hotkey.grammar, loaded.hotkey.grammar);

        // InjectConfig
        assert_eq!(
            original.inject.fast_char_delay_ms,
            loaded.inject.fast_char_delay_ms
        );
        assert_eq!(
            original.inject.capable_char_delay_ms,
            loaded.inject.capable_char_delay_ms
        );
        assert_eq!(
            original.inject.newline_replacement,
            loaded.inject.newline_replacement
        );
        assert_eq!(
            original.inject.capture_selection,
            loaded.inject.capture_selection
        );

        // TranslateConfig
        assert_eq!(
            original.translate.reference_language,
            loaded.translate.reference_language
        );
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.llm.fast_model, default.llm.fast_model);
        assert_eq!(config.hotkey.ask, default.hotkey.ask);
        assert_eq!(
            config.inject.fast_char_delay_ms,
            default.inject.fast_char_delay_ms
        );
    }

    /// Verify the defaults the rest of the app assumes.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.base_url, "https://api.openai.com");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.llm.fast_model, "gpt-3.5-turbo");
        assert_eq!(cfg.llm.capable_model, "gpt-4");
        assert_eq!(cfg.hotkey.ask, "F9");
        assert_eq!(cfg.hotkey.grammar, "Ctrl+F8");
        assert_eq!(cfg.inject.fast_char_delay_ms, 10);
        assert_eq!(cfg.inject.capable_char_delay_ms, 30);
        assert_eq!(cfg.inject.newline_replacement, " ");
        assert!(cfg.inject.capture_selection);
        assert_eq!(cfg.translate.reference_language, "English");
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.llm.base_url = "http://localhost:11434".into();
        cfg.llm.api_key = Some("sk-test".into());
        cfg.llm.fast_model = "gpt-4o-mini".into();
        cfg.hotkey.ask = "F10".into();
        cfg.inject.fast_char_delay_ms = 5;
        cfg.inject.capture_selection = false;
        cfg.translate.reference_language = "German".into();

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.llm.base_url, "http://localhost:11434");
        assert_eq!(loaded.llm.api_key, Some("sk-test".into()));
        assert_eq!(loaded.llm.fast_model, "gpt-4o-mini");
        assert_eq!(loaded.hotkey.ask, "F10");
        assert_eq!(loaded.inject.fast_char_delay_ms, 5);
        assert!(!loaded.inject.capture_selection);
        assert_eq!(loaded.translate.reference_language, "German");
    }
}
