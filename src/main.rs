//! Application entry point — quickgpt.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the streaming completion client and the OS collaborators
//!    (keystroke sink, clipboard reader).
//! 5. Create channels (`trigger`, `ui`, single-slot `run` queue).
//! 6. Spawn the pipeline runner and the trigger dispatcher on the runtime.
//! 7. Start the hotkey listener thread (a bad chord disables only itself).
//! 8. Build the tray icon + menu (failure is tolerated; hotkeys remain).
//! 9. Run [`eframe::run_native`] — blocks the main thread with the hidden
//!    prompt window until the tray Quit item closes it.

use std::sync::Arc;

use tokio::sync::mpsc;

use quickgpt::{
    app::PromptApp,
    config::AppConfig,
    inject::{ClipboardReader, KeyboardSink, KeystrokeSink, SystemClipboard},
    llm::{ApiClient, CompletionClient},
    pipeline::{run_channel, PipelineRunner},
    trigger::{bindings_from_config, Dispatcher, HotkeyListener, TrayMenu, TriggerEvent, UiCommand},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options() -> eframe::NativeOptions {
    let vp = egui::ViewportBuilder::default()
        .with_visible(false)
        .with_inner_size([520.0, 52.0])
        .with_resizable(false)
        .with_always_on_top();

    eframe::NativeOptions {
        viewport: vp,
        centered: true,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("quickgpt starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads — dispatcher + runner each take one)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Completion client + OS collaborators
    let client: Arc<dyn CompletionClient> = Arc::new(ApiClient::from_config(&config.llm));
    let sink: Arc<dyn KeystrokeSink> = Arc::new(KeyboardSink::new());
    let clipboard: Arc<dyn ClipboardReader> = Arc::new(SystemClipboard::new());

    // 5. Channel setup
    let (trigger_tx, trigger_rx) = mpsc::channel::<TriggerEvent>(16);
    let (ui_tx, ui_rx) = mpsc::channel::<UiCommand>(16);
    let (runs, run_rx) = run_channel();

    // 6. Pipeline runner + dispatcher tasks
    rt.spawn(PipelineRunner::new(client, sink, &config.inject).run(run_rx));
    rt.spawn(
        Dispatcher::new(ui_tx.clone(), runs, clipboard, config.clone()).run(trigger_rx),
    );

    // 7. Hotkey listener thread
    let bindings = bindings_from_config(&config.hotkey);
    let _hotkeys = HotkeyListener::start(bindings, trigger_tx.clone());

    // 8. Tray menu — keep the handle alive for the process lifetime.
    let _tray = match TrayMenu::build(trigger_tx.clone(), ui_tx) {
        Ok(tray) => Some(tray),
        Err(e) => {
            log::error!("tray unavailable ({e}); hotkeys remain active");
            None
        }
    };

    // 9. Prompt window (blocks until the tray Quit item closes it)
    eframe::run_native(
        "quickgpt",
        native_options(),
        Box::new(move |_cc| Ok(Box::new(PromptApp::new(ui_rx, trigger_tx)))),
    )
}
