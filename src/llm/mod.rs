//! Streaming completion module.
//!
//! This module provides:
//! * [`CompletionClient`] — async trait implemented by completion backends.
//! * [`ApiClient`] — OpenAI-compatible streaming chat-completions client.
//! * [`PromptRequest`] / [`ModelTier`] — the immutable per-run request.
//! * [`CompletionStream`] — ordered fragment stream handed to the pipeline.
//! * [`LlmError`] — error variants for completion operations.
//!
//! # Stream semantics
//!
//! A [`CompletionStream`] yields text fragments strictly in arrival order.
//! The channel closing is the end-of-stream signal; an `Err` item is a
//! mid-stream failure after which no further fragments arrive.

pub mod client;
pub mod sse;

pub use client::{ApiClient, CompletionClient, LlmError};

use std::time::Duration;

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// ModelTier
// ---------------------------------------------------------------------------

/// Selects which configured model serves a request.
///
/// The tier is resolved to a concrete model name by the client from
/// [`crate::config::LlmConfig`] at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Cheap, low-latency model (Ask, Grammar).
    Fast,
    /// Stronger model for translation quality (Translate, Translate To).
    Capable,
}

// ---------------------------------------------------------------------------
// PromptRequest
// ---------------------------------------------------------------------------

/// One fully-shaped completion request, built by an action handler and owned
/// by the run that executes it.  Immutable once constructed.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// System message sent ahead of the user message.
    pub system_instruction: String,
    /// User message (typed prompt text or clipboard snapshot).
    pub user_message: String,
    /// Which configured model serves this request.
    pub tier: ModelTier,
    /// Pause inserted between injected characters.
    pub char_delay: Duration,
}

// ---------------------------------------------------------------------------
// CompletionStream
// ---------------------------------------------------------------------------

/// Ordered stream of text fragments from an in-flight completion.
///
/// Backed by a `tokio::sync::mpsc` channel so mock clients in tests can feed
/// fragments through the identical interface the real client uses.
pub struct CompletionStream {
    rx: mpsc::Receiver<Result<String, LlmError>>,
}

impl CompletionStream {
    /// Wrap an existing receiver.
    pub fn new(rx: mpsc::Receiver<Result<String, LlmError>>) -> Self {
        Self { rx }
    }

    /// Create a sender/stream pair.  The stream ends when every sender is
    /// dropped.
    pub fn channel(buffer: usize) -> (mpsc::Sender<Result<String, LlmError>>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }

    /// Receive the next fragment.
    ///
    /// * `Some(Ok(text))` — the next fragment, in arrival order.
    /// * `Some(Err(e))` — a mid-stream failure; the stream is dead.
    /// * `None` — end-of-stream.
    pub async fn next_fragment(&mut self) -> Option<Result<String, LlmError>> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
