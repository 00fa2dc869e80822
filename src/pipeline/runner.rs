//! Pipeline runner — drives one streaming completion into paced keystrokes.
//!
//! [`PipelineRunner`] owns the [`CompletionClient`] and the
//! [`KeystrokeSink`] and consumes [`PromptRequest`]s from a capacity-1
//! channel, so runs are strictly serialized: characters from two triggers
//! can never interleave at the focused window.
//!
//! All failure paths end the current run only.  Stream failures are made
//! visible by typing the error text at the cursor (partial output already
//! typed stays where it is — there is no rollback); unexpected task faults
//! surface as a [`RunError`] that the supervising loop logs before moving to
//! the next queued request.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::InjectConfig;
use crate::inject::{InjectError, KeystrokeSink};
use crate::llm::{CompletionClient, PromptRequest};

// ---------------------------------------------------------------------------
// RunError
// ---------------------------------------------------------------------------

/// Faults that end a run without reaching the normal end-of-stream.
///
/// Stream-level failures are *not* represented here — those are surfaced to
/// the user by typing the error text and the run finishes normally.
#[derive(Debug, Error)]
pub enum RunError {
    /// The keystroke sink rejected a character; no further characters of
    /// this run are emitted.
    #[error("text injection failed: {0}")]
    Inject(#[from] InjectError),

    /// Internal / unexpected error (e.g. tokio join failure).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// RunQueue
// ---------------------------------------------------------------------------

/// Submission handle for the single-slot run queue.
///
/// Cheap to clone; handler tasks call [`submit`](Self::submit) and return
/// immediately — dispatch never waits for a run.
#[derive(Clone)]
pub struct RunQueue {
    tx: mpsc::Sender<PromptRequest>,
}

impl RunQueue {
    pub fn new(tx: mpsc::Sender<PromptRequest>) -> Self {
        Self { tx }
    }

    /// Enqueue a request without blocking.
    ///
    /// Returns `false` when the request was dropped: either a run is active
    /// and another is already pending (queue slot full), or the runner task
    /// is gone.
    pub fn submit(&self, req: PromptRequest) -> bool {
        match self.tx.try_send(req) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("run queue full — trigger dropped (a run is active and one is pending)");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::error!("run queue closed — runner task is gone");
                false
            }
        }
    }
}

/// Create the single-slot queue: a [`RunQueue`] for producers and the
/// receiver the [`PipelineRunner`] consumes.
pub fn run_channel() -> (RunQueue, mpsc::Receiver<PromptRequest>) {
    let (tx, rx) = mpsc::channel(1);
    (RunQueue::new(tx), rx)
}

// ---------------------------------------------------------------------------
// PipelineRunner
// ---------------------------------------------------------------------------

/// Executes queued runs one at a time.
///
/// Create with [`PipelineRunner::new`], then spawn [`run`](Self::run) on the
/// tokio runtime.
pub struct PipelineRunner {
    client: Arc<dyn CompletionClient>,
    sink: Arc<dyn KeystrokeSink>,
    newline_replacement: String,
}

impl PipelineRunner {
    /// Create a new runner.
    ///
    /// * `client` — streaming completion backend.
    /// * `sink`   — keystroke output.
    /// * `config` — injection settings (newline normalization).
    pub fn new(
        client: Arc<dyn CompletionClient>,
        sink: Arc<dyn KeystrokeSink>,
        config: &InjectConfig,
    ) -> Self {
        Self {
            client,
            sink,
            newline_replacement: config.newline_replacement.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run queued requests until `rx` is closed.
    ///
    /// Spawn this as a tokio task from `main()`.  A failed run is logged and
    /// the loop continues with the next request.
    pub async fn run(self, mut rx: mpsc::Receiver<PromptRequest>) {
        while let Some(req) = rx.recv().await {
            if let Err(e) = self.run_one(req).await {
                log::error!("pipeline: run failed: {e}");
            }
        }

        log::info!("pipeline: run queue closed, runner shutting down");
    }

    // -----------------------------------------------------------------------
    // Single run
    // -----------------------------------------------------------------------

    /// Execute one run: open the stream, then type fragments in arrival
    /// order until end-of-stream or a failure.
    ///
    /// Stream failures (open or mid-stream) are typed at the cursor so the
    /// user sees them where the answer would have appeared; they are not
    /// `RunError`s.  No retry in either case.
    async fn run_one(&self, req: PromptRequest) -> Result<(), RunError> {
        let mut stream = match self.client.open_stream(&req).await {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("pipeline: could not open stream: {e}");
                self.type_text(&e.to_string(), req.char_delay).await?;
                return Ok(());
            }
        };

        while let Some(item) = stream.next_fragment().await {
            match item {
                Ok(fragment) => {
                    let text = normalize_fragment(&fragment, &self.newline_replacement);
                    self.type_text(&text, req.char_delay).await?;
                }
                Err(e) => {
                    log::warn!("pipeline: stream failed mid-run: {e}");
                    self.type_text(&e.to_string(), req.char_delay).await?;
                    break;
                }
            }
        }

        log::debug!("pipeline: run finished");
        Ok(())
    }

    /// Type `text` one character at a time with `delay` between characters.
    ///
    /// Each keystroke goes through `spawn_blocking` because the OS input
    /// call is synchronous; the await between characters keeps ordering
    /// strict and never stalls the runtime.
    async fn type_text(&self, text: &str, delay: Duration) -> Result<(), RunError> {
        for c in text.chars() {
            let sink = Arc::clone(&self.sink);
            tokio::task::spawn_blocking(move || sink.type_char(c))
                .await
                .map_err(|e| RunError::Internal(e.to_string()))??;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fragment normalization
// ---------------------------------------------------------------------------

/// Replace internal line breaks with `replacement` so a mid-stream newline
/// never breaks out of the target's single-line input field.
///
/// CRLF collapses to a single replacement, not two.
pub fn normalize_fragment(fragment: &str, replacement: &str) -> String {
    fragment
        .replace("\r\n", replacement)
        .replace(['\n', '\r'], replacement)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
