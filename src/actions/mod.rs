//! Action handlers — shape one [`PromptRequest`] per trigger.
//!
//! Each of the four actions pairs a system instruction with the user's input
//! text, picks a model tier, and picks the injection pacing for that tier.
//! Handlers are pure request builders; the dispatcher owns input gathering
//! (prompt text, clipboard snapshot) and the pipeline owns execution.
//!
//! | Action      | Input                    | Tier    | Pacing          |
//! |-------------|--------------------------|---------|-----------------|
//! | Ask         | typed prompt text        | Fast    | fast delay      |
//! | TranslateTo | prompt text = language,  | Capable | capable delay   |
//! |             | clipboard = text         |         |                 |
//! | Translate   | clipboard                | Capable | capable delay   |
//! | Grammar     | clipboard                | Fast    | fast delay      |

pub mod prompts;

pub use prompts::{
    already_translated_marker, ask_instruction, grammar_instruction, translate_instruction,
    translate_to_instruction,
};

use std::time::Duration;

use crate::config::AppConfig;
use crate::llm::{ModelTier, PromptRequest};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The four user-facing actions, each reachable from a hotkey and a tray
/// item.
///
/// The active action is never stored globally: triggers carry it with them
/// (into the prompt surface and back out through its confirm event), so the
/// last trigger always wins without a shared-write hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Answer a typed question.
    Ask,
    /// Translate the clipboard into a typed target language.
    TranslateTo,
    /// Translate the clipboard into the configured reference language.
    Translate,
    /// Fix grammar/spelling of the clipboard.
    Grammar,
}

impl Action {
    /// Whether this action needs free-form text from the prompt window
    /// before a request can be built.
    pub fn needs_prompt(&self) -> bool {
        matches!(self, Action::Ask | Action::TranslateTo)
    }

    /// Tray-menu label.
    pub fn menu_label(&self) -> &'static str {
        match self {
            Action::Ask => "Ask",
            Action::TranslateTo => "Translate To",
            Action::Translate => "Translate",
            Action::Grammar => "Grammar",
        }
    }

    /// Prompt-window title shown while collecting this action's input.
    ///
    /// `None` for actions that never open the prompt.
    pub fn prompt_title(&self) -> Option<&'static str> {
        match self {
            Action::Ask => Some("Enter Question"),
            Action::TranslateTo => Some("Enter Language"),
            Action::Translate | Action::Grammar => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

/// Ask: the typed question is the user message.
pub fn ask_request(question: &str, config: &AppConfig) -> PromptRequest {
    request(
        ask_instruction(),
        question,
        ModelTier::Fast,
        config,
    )
}

/// Translate-To: the typed text names the target language; the clipboard
/// snapshot is the text to translate.
pub fn translate_to_request(
    language: &str,
    clipboard_text: &str,
    config: &AppConfig,
) -> PromptRequest {
    request(
        translate_to_instruction(language),
        clipboard_text,
        ModelTier::Capable,
        config,
    )
}

/// Translate: the clipboard snapshot is translated into the configured
/// reference language under the two-branch reply contract.
pub fn translate_request(clipboard_text: &str, config: &AppConfig) -> PromptRequest {
    request(
        translate_instruction(&config.translate.reference_language),
        clipboard_text,
        ModelTier::Capable,
        config,
    )
}

/// Grammar: the clipboard snapshot is corrected in place.
pub fn grammar_request(clipboard_text: &str, config: &AppConfig) -> PromptRequest {
    request(
        grammar_instruction(),
        clipboard_text,
        ModelTier::Fast,
        config,
    )
}

fn request(
    system_instruction: String,
    user_message: &str,
    tier: ModelTier,
    config: &AppConfig,
) -> PromptRequest {
    PromptRequest {
        system_instruction,
        user_message: user_message.to_string(),
        tier,
        char_delay: char_delay(config, tier),
    }
}

/// Injection pacing for a tier, from config.
fn char_delay(config: &AppConfig, tier: ModelTier) -> Duration {
    let ms = match tier {
        ModelTier::Fast => config.inject.fast_char_delay_ms,
        ModelTier::Capable => config.inject.capable_char_delay_ms,
    };
    Duration::from_millis(ms)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
