//! quickgpt — trigger-to-injection pipeline for quick text actions.
//!
//! A background desktop utility: global hotkeys or tray items trigger one of
//! four actions (ask a question, translate the clipboard, translate into a
//! named language, fix grammar), a streaming completion request produces the
//! answer, and the answer is typed into whatever window currently has
//! keyboard focus as paced synthetic keystrokes.
//!
//! ```text
//! hotkeys / tray / prompt ─▶ trigger::Dispatcher ─▶ actions (request shaping)
//!                                                        │
//!                                     pipeline::RunQueue ▼ (single slot)
//!                                     pipeline::PipelineRunner
//!                                        ├─▶ llm (streaming fragments)
//!                                        └─▶ inject (paced keystrokes)
//! ```

pub mod actions;
pub mod app;
pub mod config;
pub mod inject;
pub mod llm;
pub mod pipeline;
pub mod trigger;
