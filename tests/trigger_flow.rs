//! End-to-end trigger → injection flow against mock collaborators.
//!
//! Wires the real dispatcher, run queue and pipeline runner together with a
//! canned completion client, a fixed clipboard and a recording keystroke
//! sink — everything except the OS and the network.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use quickgpt::actions::{already_translated_marker, Action};
use quickgpt::config::AppConfig;
use quickgpt::inject::{ClipboardReader, InjectError, KeystrokeSink};
use quickgpt::llm::{CompletionClient, CompletionStream, LlmError, PromptRequest};
use quickgpt::pipeline::{run_channel, PipelineRunner};
use quickgpt::trigger::{bindings_from_config, Dispatcher, TriggerEvent, UiCommand};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Completion client that streams one canned reply in small fragments and
/// records every request it sees.
struct CannedClient {
    reply: String,
    requests: Arc<Mutex<Vec<PromptRequest>>>,
}

impl CannedClient {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn open_stream(&self, req: &PromptRequest) -> Result<CompletionStream, LlmError> {
        self.requests.lock().unwrap().push(req.clone());

        let (tx, stream) = CompletionStream::channel(32);
        let reply = self.reply.clone();
        tokio::spawn(async move {
            // Stream in word-sized fragments like a real provider would.
            for piece in reply.split_inclusive(' ') {
                if tx.send(Ok(piece.to_string())).await.is_err() {
                    return;
                }
            }
        });
        Ok(stream)
    }
}

/// Keystroke sink that records every character.
#[derive(Clone, Default)]
struct RecordingSink {
    chars: Arc<Mutex<Vec<char>>>,
}

impl RecordingSink {
    fn typed(&self) -> String {
        self.chars.lock().unwrap().iter().collect()
    }
}

impl KeystrokeSink for RecordingSink {
    fn type_char(&self, c: char) -> Result<(), InjectError> {
        self.chars.lock().unwrap().push(c);
        Ok(())
    }
}

/// Clipboard with fixed content.
struct FixedClipboard(String);

impl ClipboardReader for FixedClipboard {
    fn read_text(&self) -> Result<String, InjectError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Zero-delay config so tests assert on content, not pacing; selection
/// capture off so nothing touches the OS input layer.
fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.inject.fast_char_delay_ms = 0;
    config.inject.capable_char_delay_ms = 0;
    config.inject.capture_selection = false;
    config
}

struct Harness {
    trigger_tx: mpsc::Sender<TriggerEvent>,
    ui_rx: mpsc::Receiver<UiCommand>,
    sink: RecordingSink,
    requests: Arc<Mutex<Vec<PromptRequest>>>,
    runner: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(client: CannedClient, clipboard_text: &str) -> Self {
        let config = test_config();
        let sink = RecordingSink::default();
        let requests = Arc::clone(&client.requests);

        let (trigger_tx, trigger_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(16);
        let (runs, run_rx) = run_channel();

        let runner = tokio::spawn(
            PipelineRunner::new(Arc::new(client), Arc::new(sink.clone()), &config.inject)
                .run(run_rx),
        );

        let dispatcher = Dispatcher::new(
            ui_tx,
            runs,
            Arc::new(FixedClipboard(clipboard_text.to_string())),
            config,
        );
        tokio::spawn(dispatcher.run(trigger_rx));

        Self {
            trigger_tx,
            ui_rx,
            sink,
            requests,
            runner,
        }
    }

    /// Close the trigger channel and wait for queued runs to drain.
    async fn finish(self) -> (String, Vec<PromptRequest>) {
        drop(self.trigger_tx);
        drop(self.ui_rx);
        self.runner.await.unwrap();
        let requests = self.requests.lock().unwrap().clone();
        (self.sink.typed(), requests)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Translate over clipboard text already in the reference language: the
/// canned marker reply arrives at the cursor verbatim, and the request
/// carried the two-branch instruction contract.
#[tokio::test]
async fn translate_of_reference_language_text_types_the_marker() {
    let marker = already_translated_marker("English");
    let h = Harness::start(CannedClient::new(&marker), "plain ascii english text");

    h.trigger_tx
        .send(TriggerEvent::Activated(Action::Translate))
        .await
        .unwrap();

    let (typed, requests) = h.finish().await;

    assert_eq!(typed, "Message is already in English");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_message, "plain ascii english text");
    assert!(requests[0].system_instruction.contains(&marker));
}

/// Ask "2 + 2" with a client answering "4": exactly `4` is typed.
#[tokio::test]
async fn ask_types_the_canned_answer() {
    let mut h = Harness::start(CannedClient::new("4"), "");

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

    let (typed, requests) = h.finish().await;

    assert_eq!(typed, "4");
    assert_eq!(requests[0].user_message, "2 + 2");
}

/// A chord that fails to register disables only its own binding; a
/// tray-style activation of the same action still completes a full run.
#[tokio::test]
async fn broken_hotkey_binding_leaves_tray_trigger_functional() {
    let mut config = test_config();
    config.hotkey.translate = "F19".into(); // not representable → registration fails

    let bindings = bindings_from_config(&config.hotkey);
    let bound: Vec<Action> = bindings.iter().map(|(_, a)| *a).collect();
    assert!(!bound.contains(&Action::Translate));
    assert_eq!(bound.len(), 3);

    // The tray path bypasses chord registration entirely.
    let h = Harness::start(CannedClient::new("hola"), "hello");
    h.trigger_tx
        .send(TriggerEvent::Activated(Action::Translate))
        .await
        .unwrap();

    let (typed, _) = h.finish().await;
    assert_eq!(typed, "hola");
}

/// Mid-word fragmentation must be invisible in the output: fragments are
/// concatenated in arrival order with nothing dropped or duplicated.
#[tokio::test]
async fn fragmented_reply_is_reassembled_in_order() {
    let h = Harness::start(
        CannedClient::new("the quick brown fox jumps"),
        "clipboard",
    );

    h.trigger_tx
        .send(TriggerEvent::Activated(Action::Grammar))
        .await
        .unwrap();

    let (typed, _) = h.finish().await;
    assert_eq!(typed, "the quick brown fox jumps");
}
