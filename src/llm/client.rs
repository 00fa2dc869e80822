//! Core `CompletionClient` trait and `ApiClient` implementation.
//!
//! `ApiClient` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! with `stream: true` — OpenAI, Groq, LM Studio, vLLM, Ollama (OpenAI
//! mode), etc.  All connection details come from [`LlmConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::LlmConfig;
use crate::llm::sse::{SseEvent, SseParser};
use crate::llm::{CompletionStream, ModelTier, PromptRequest};

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while opening or consuming a completion stream.
///
/// The `Display` text of these variants is what the pipeline types at the
/// focused cursor when a run fails, so every variant reads as a short
/// human-facing sentence.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status (bad key, unknown
    /// model, rate limit …).
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be read mid-stream.
    #[error("stream interrupted: {0}")]
    Stream(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// CompletionClient trait
// ---------------------------------------------------------------------------

/// Async trait for streaming completion backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (wrapped in `Arc<dyn CompletionClient>`).  One call means one attempt:
/// no retry or backoff happens at this layer or above it.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open a completion stream for `req`.
    ///
    /// Returns `Err` when the stream cannot be opened at all (network, auth,
    /// malformed request); mid-stream failures arrive as `Err` items on the
    /// returned [`CompletionStream`].
    async fn open_stream(&self, req: &PromptRequest) -> Result<CompletionStream, LlmError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Streams from an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The HTTP client is built without a total request timeout: a run waits on
/// its stream for as long as the server keeps the connection open, and only
/// that run's task is parked by a stall.
pub struct ApiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    ///
    /// The API key is taken from `config.api_key` when set and non-empty,
    /// falling back to the `OPENAI_API_KEY` environment variable.  With
    /// neither present no `Authorization` header is sent — fine for local
    /// providers that require no authentication.
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()));

        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            api_key,
        }
    }

    /// Resolve a tier to the configured model name.
    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.config.fast_model,
            ModelTier::Capable => &self.config.capable_model,
        }
    }
}

#[async_trait]
impl CompletionClient for ApiClient {
    async fn open_stream(&self, req: &PromptRequest) -> Result<CompletionStream, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model": self.model_for(req.tier),
            "messages": [
                { "role": "system", "content": req.system_instruction },
                { "role": "user",   "content": req.user_message       }
            ],
            "stream": true
        });

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: first_line(&message),
            });
        }

        let (tx, stream) = CompletionStream::channel(32);
        tokio::spawn(pump_body(response, tx));
        Ok(stream)
    }
}

// ---------------------------------------------------------------------------
// Body pump
// ---------------------------------------------------------------------------

/// Forward SSE fragments from the HTTP body into the stream channel.
///
/// Runs as its own task per stream.  Returning drops `tx`, which closes the
/// channel — the end-of-stream signal.  A body read error is forwarded as a
/// single `Err` item and then the pump stops; if the receiver is gone the
/// pump stops silently.
async fn pump_body(response: reqwest::Response, tx: mpsc::Sender<Result<String, LlmError>>) {
    let mut body = response.bytes_stream();
    let mut parser = SseParser::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(Err(LlmError::Stream(e.to_string()))).await;
                return;
            }
        };

        for event in parser.push(&chunk) {
            match event {
                SseEvent::Delta(text) => {
                    if tx.send(Ok(text)).await.is_err() {
                        return;
                    }
                }
                SseEvent::Done => return,
            }
        }
    }
    // Body ended without [DONE]; treat the close as end-of-stream.
}

/// First line of an error body, trimmed — keeps injected error text short.
fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or("").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
