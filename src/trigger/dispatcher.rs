//! Trigger dispatcher — arbitrates trigger events into prompt openings and
//! pipeline runs.
//!
//! [`Dispatcher`] consumes [`TriggerEvent`]s from a single mpsc channel fed
//! by every trigger source.  Each event spawns its own handler task so a
//! slow clipboard read or selection capture never delays the next trigger;
//! handler tasks return a `Result` that the spawning wrapper logs, so a
//! failed handler dies alone.
//!
//! # Per-action flow
//!
//! ```text
//! Activated(Ask)          → OpenPrompt(Ask)
//! Activated(TranslateTo)  → capture selection → OpenPrompt(TranslateTo)
//! Activated(Translate)    → clipboard snapshot → translate_request → submit
//! Activated(Grammar)      → capture selection → clipboard snapshot
//!                           → grammar_request → submit
//! PromptConfirmed(Ask, q)          → ask_request(q) → submit
//! PromptConfirmed(TranslateTo, l)  → clipboard snapshot
//!                                    → translate_to_request(l, clip) → submit
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::actions::{self, Action};
use crate::config::AppConfig;
use crate::inject::{capture_selection, ClipboardReader, InjectError};
use crate::llm::PromptRequest;
use crate::pipeline::RunQueue;
use crate::trigger::{TriggerEvent, UiCommand};

/// Pause between cutting the focused selection and reading the clipboard,
/// giving the focused application time to service the cut.
const CAPTURE_SETTLE: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// DispatchError
// ---------------------------------------------------------------------------

/// Faults inside one handler task.  Logged by the spawning wrapper; never
/// propagated to other handlers, listeners, or the process.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Selection capture or clipboard access failed.
    #[error(transparent)]
    Inject(#[from] InjectError),

    /// The prompt window's command channel is closed.
    #[error("prompt window is gone")]
    UiClosed,

    /// Internal / unexpected error (e.g. tokio join failure).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes trigger events to the prompt window or straight into the run
/// queue.
///
/// Cloneable: every field is a channel handle, an `Arc`, or plain config, so
/// each handler task gets its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    ui_tx: mpsc::Sender<UiCommand>,
    runs: RunQueue,
    clipboard: Arc<dyn ClipboardReader>,
    config: AppConfig,
}

impl Dispatcher {
    pub fn new(
        ui_tx: mpsc::Sender<UiCommand>,
        runs: RunQueue,
        clipboard: Arc<dyn ClipboardReader>,
        config: AppConfig,
    ) -> Self {
        Self {
            ui_tx,
            runs,
            clipboard,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the dispatcher until `rx` is closed.
    ///
    /// Spawn this as a tokio task from `main()`.  Every received event is
    /// handled in its own task; this loop itself never awaits a handler.
    pub async fn run(self, mut rx: mpsc::Receiver<TriggerEvent>) {
        while let Some(event) = rx.recv().await {
            self.dispatch(event);
        }

        log::info!("dispatcher: trigger channel closed, shutting down");
    }

    /// Spawn the handler task for one event.
    fn dispatch(&self, event: TriggerEvent) {
        let handler = self.clone();
        tokio::spawn(async move {
            let label = match &event {
                TriggerEvent::Activated(action) => action.menu_label(),
                TriggerEvent::PromptConfirmed { action, .. } => action.menu_label(),
            };

            let result = match event {
                TriggerEvent::Activated(action) => handler.handle_activation(action).await,
                TriggerEvent::PromptConfirmed { action, text } => {
                    handler.handle_confirmation(action, &text).await
                }
            };

            if let Err(e) = result {
                log::error!("dispatcher: {label} handler failed: {e}");
            }
        });
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Handle a hotkey or tray activation.
    async fn handle_activation(&self, action: Action) -> Result<(), DispatchError> {
        log::info!("trigger: {}", action.menu_label());

        match action {
            // Ask collects its entire input from the prompt.
            Action::Ask => self.open_prompt(action).await,

            // Translate To needs the focused field on the clipboard *before*
            // the prompt opens (the prompt steals focus), then asks for the
            // target language.
            Action::TranslateTo => {
                self.capture_focused_field().await?;
                self.open_prompt(action).await
            }

            Action::Translate => {
                let text = self.clipboard_snapshot().await?;
                self.submit(actions::translate_request(&text, &self.config));
                Ok(())
            }

            Action::Grammar => {
                self.capture_focused_field().await?;
                let text = self.clipboard_snapshot().await?;
                self.submit(actions::grammar_request(&text, &self.config));
                Ok(())
            }
        }
    }

    /// Handle the prompt window's confirm event.
    async fn handle_confirmation(&self, action: Action, text: &str) -> Result<(), DispatchError> {
        match action {
            Action::Ask => {
                log::info!("ask: {text}");
                self.submit(actions::ask_request(text, &self.config));
                Ok(())
            }
            Action::TranslateTo => {
                let clipboard_text = self.clipboard_snapshot().await?;
                log::info!("translate to {text}");
                self.submit(actions::translate_to_request(
                    text,
                    &clipboard_text,
                    &self.config,
                ));
                Ok(())
            }
            // Translate and Grammar never open the prompt.
            Action::Translate | Action::Grammar => {
                log::warn!(
                    "dispatcher: ignoring prompt confirmation for {}",
                    action.menu_label()
                );
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn open_prompt(&self, action: Action) -> Result<(), DispatchError> {
        self.ui_tx
            .send(UiCommand::OpenPrompt(action))
            .await
            .map_err(|_| DispatchError::UiClosed)
    }

    /// Cut the focused field's content onto the clipboard, then wait for the
    /// focused application to service the cut.  No-op when disabled in
    /// config.
    async fn capture_focused_field(&self) -> Result<(), DispatchError> {
        if !self.config.inject.capture_selection {
            return Ok(());
        }

        tokio::task::spawn_blocking(capture_selection)
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))??;
        tokio::time::sleep(CAPTURE_SETTLE).await;
        Ok(())
    }

    /// Snapshot the clipboard's text content on the blocking pool.
    async fn clipboard_snapshot(&self) -> Result<String, DispatchError> {
        let clipboard = Arc::clone(&self.clipboard);
        let text = tokio::task::spawn_blocking(move || clipboard.read_text())
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))??;
        Ok(text)
    }

    /// Fire-and-forget submission; a dropped trigger was already logged by
    /// the queue.
    fn submit(&self, req: PromptRequest) {
        let _ = self.runs.submit(req);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelTier;
    use crate::pipeline::run_channel;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Clipboard that always returns the same snapshot.
    struct FixedClipboard(String);

    impl ClipboardReader for FixedClipboard {
        fn read_text(&self) -> Result<String, InjectError> {
            Ok(self.0.clone())
        }
    }

    /// Clipboard that cannot be opened.
    struct BrokenClipboard;

    impl ClipboardReader for BrokenClipboard {
        fn read_text(&self) -> Result<String, InjectError> {
            Err(InjectError::ClipboardAccess("denied".into()))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Config with selection capture off so tests never touch the OS input
    /// layer.
    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.inject.capture_selection = false;
        config
    }

    struct Harness {
        trigger_tx: mpsc::Sender<TriggerEvent>,
        ui_rx: mpsc::Receiver<UiCommand>,
        run_rx: mpsc::Receiver<PromptRequest>,
    }

    fn start_dispatcher(clipboard: Arc<dyn ClipboardReader>) -> Harness {
        let (trigger_tx, trigger_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(16);
        let (runs, run_rx) = run_channel();

        let dispatcher = Dispatcher::new(ui_tx, runs, clipboard, test_config());
        tokio::spawn(dispatcher.run(trigger_rx));

        Harness {
            trigger_tx,
            ui_rx,
            run_rx,
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// Translate goes straight to the run queue with the clipboard snapshot
    /// as the user message — no prompt involved.
    #[tokio::test]
    async fn translate_submits_clipboard_snapshot() {
        let mut h = start_dispatcher(Arc::new(FixedClipboard("bonjour le monde".into())));

        h.trigger_tx
            .send(TriggerEvent::Activated(Action::Translate))
            .await
            .unwrap();

        let req = h.run_rx.recv().await.expect("request");
        assert_eq!(req.user_message, "bonjour le monde");
        assert_eq!(req.tier, ModelTier::Capable);
        assert!(req.system_instruction.contains("Translation:"));
    }

    /// Grammar also runs off the clipboard, on the Fast tier.
    #[tokio::test]
    async fn grammar_submits_clipboard_snapshot() {
        let mut h = start_dispatcher(Arc::new(FixedClipboard("teh text".into())));

        h.trigger_tx
            .send(TriggerEvent::Activated(Action::Grammar))
            .await
            .unwrap();

        let req = h.run_rx.recv().await.expect("request");
        assert_eq!(req.user_message, "teh text");
        assert_eq!(req.tier, ModelTier::Fast);
        assert!(req.system_instruction.contains("fix the grammar"));
    }

    /// Ask opens the prompt instead of running; confirming the prompt
    /// produces the run.
    #[tokio::test]
    async fn ask_round_trips_through_the_prompt() {
        let mut h = start_dispatcher(Arc::new(FixedClipboard(String::new())));

        h.trigger_tx
            .send(TriggerEvent::Activated(Action::Ask))
            .await
            .unwrap();
        assert_eq!(
            h.ui_rx.recv().await,
            Some(UiCommand::OpenPrompt(Action::Ask))
        );

        h.trigger_tx
            .send(TriggerEvent::PromptConfirmed {
                action: Action::Ask,
                text: "2 + 2".into(),
            })
            .await
            .unwrap();

        let req = h.run_rx.recv().await.expect("request");
        assert_eq!(req.user_message, "2 + 2");
        assert_eq!(req.tier, ModelTier::Fast);
        assert_eq!(req.char_delay, Duration::from_millis(10));
    }

    /// Translate To: the prompt text names the language, the clipboard
    /// supplies the text.
    #[tokio::test]
    async fn translate_to_uses_prompt_text_as_language() {
        let mut h = start_dispatcher(Arc::new(FixedClipboard("good morning".into())));

        h.trigger_tx
            .send(TriggerEvent::Activated(Action::TranslateTo))
            .await
            .unwrap();
        assert_eq!(
            h.ui_rx.recv().await,
            Some(UiCommand::OpenPrompt(Action::TranslateTo))
        );

        h.trigger_tx
            .send(TriggerEvent::PromptConfirmed {
                action: Action::TranslateTo,
                text: "Spanish".into(),
            })
            .await
            .unwrap();

        let req = h.run_rx.recv().await.expect("request");
        assert_eq!(req.user_message, "good morning");
        assert!(req.system_instruction.contains("translate it to Spanish"));
    }

    /// A failing handler (broken clipboard) must not take the dispatcher
    /// down: the next trigger still works.  This doubles as the
    /// listener-isolation property — a dead trigger source's sibling events
    /// keep completing.
    #[tokio::test]
    async fn failed_handler_leaves_dispatcher_alive() {
        let (trigger_tx, trigger_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);
        let (runs, _run_rx) = run_channel();

        let dispatcher = Dispatcher::new(
            ui_tx,
            runs,
            Arc::new(BrokenClipboard),
            test_config(),
        );
        tokio::spawn(dispatcher.run(trigger_rx));

        // Fails inside the handler task (clipboard read).
        trigger_tx
            .send(TriggerEvent::Activated(Action::Translate))
            .await
            .unwrap();

        // Dispatcher must still route the next trigger.
        trigger_tx
            .send(TriggerEvent::Activated(Action::Ask))
            .await
            .unwrap();
        assert_eq!(ui_rx.recv().await, Some(UiCommand::OpenPrompt(Action::Ask)));
    }

    /// Confirmations for actions that never prompt are ignored quietly.
    #[tokio::test]
    async fn stray_confirmation_is_ignored() {
        let mut h = start_dispatcher(Arc::new(FixedClipboard("clip".into())));

        h.trigger_tx
            .send(TriggerEvent::PromptConfirmed {
                action: Action::Grammar,
                text: "noise".into(),
            })
            .await
            .unwrap();

        // Follow with a real trigger and verify only that one runs.
        h.trigger_tx
            .send(TriggerEvent::Activated(Action::Translate))
            .await
            .unwrap();

        let req = h.run_rx.recv().await.expect("request");
        assert_eq!(req.user_message, "clip");
    }
}
