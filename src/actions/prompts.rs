//! System instruction builders, one per action.
//!
//! The wording here is load-bearing: the Translate instruction pins a
//! two-branch reply contract (a `Translation: … | Language: …` line, or the
//! literal already-translated marker), and downstream consumers match on
//! those markers as free text.  Change the phrasing and the replies change.

// ---------------------------------------------------------------------------
// Fixed instructions
// ---------------------------------------------------------------------------

/// Ask: short direct answers, no worked explanations.
const ASK_INSTRUCTION: &str = "Answer the prompt very concisely, in no more \
than a few sentences. If asked to convert something like celsius to \
fahrenheit or do math just output the answer, don't explain the formula";

/// Grammar: corrections only, no commentary.
const GRAMMAR_INSTRUCTION: &str = "Take the prompt given and fix the grammar \
and spelling. Do not explain your changes. Just fix them.";

pub fn ask_instruction() -> String {
    ASK_INSTRUCTION.to_string()
}

pub fn grammar_instruction() -> String {
    GRAMMAR_INSTRUCTION.to_string()
}

// ---------------------------------------------------------------------------
// Language-parameterised instructions
// ---------------------------------------------------------------------------

/// Translate-To: casual-register translation into a user-named language,
/// leaving punctuation and phrasing as-is.
pub fn translate_to_instruction(language: &str) -> String {
    format!(
        "Take the prompt given and translate it to {language} using casual \
wording, don't correct punctuation and don't add commas."
    )
}

/// Translate: casual translation into the fixed reference language, with the
/// two-branch reply contract — either a translation plus a tag naming the
/// detected source language, or the already-translated marker verbatim.
pub fn translate_instruction(reference_language: &str) -> String {
    format!(
        "You will take the text given in the message from the user and \
translate it to {reference_language} using casual wording, don't correct \
punctuation and don't add commas. Output with the following format: \
Translation: translated message | Language: language of the original message \
before translation if there are multiple languages or the language is \
already {reference_language} then just return {marker}",
        marker = already_translated_marker(reference_language),
    )
}

/// The exact marker reply the Translate instruction demands for text that is
/// already in the reference language.
pub fn already_translated_marker(reference_language: &str) -> String {
    format!("Message is already in {reference_language}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
