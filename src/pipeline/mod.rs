//! Pipeline module — executes one completion run end to end.
//!
//! # Architecture
//!
//! ```text
//! RunQueue::submit(PromptRequest)        ← dispatcher / handler tasks
//!        │   (bounded mpsc, capacity 1; try_send — full queue drops)
//!        ▼
//! PipelineRunner::run()                  ← single async tokio task
//!        │
//!        └─ run_one(req)
//!              ├─ CompletionClient::open_stream
//!              │     └─ Err → inject error text at the cursor, finish
//!              ├─ per fragment: normalize newlines → inject char-by-char
//!              │                with req.char_delay pacing
//!              └─ mid-stream Err → inject error text, finish (no retry)
//! ```
//!
//! Exactly one run is active at a time and at most one more is pending in
//! the queue slot; everything beyond that is dropped with a log.  A failed
//! run is logged by the supervising loop and never takes down the runner,
//! the dispatcher, or a listener.

pub mod runner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{normalize_fragment, run_channel, PipelineRunner, RunError, RunQueue};
