//! Voice assistant command: capture, transcribe, dispatch.
//!
//! Runs one assistant attempt: record from the microphone until silence (or
//! Ctrl-C / SIGUSR1), send the artifact to the speech gateway, and match the
//! recognized text against the command table. With `--raw` the dispatch step
//! is skipped and the transcript just prints.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::clipboard::copy_to_clipboard;
use crate::config::VoxConfig;
use crate::dispatch::{CommandAction, CommandDispatcher};
use crate::history::HistoryManager;
use crate::quick::Phrasebook;
use crate::session::{
    CancelHandle, CpalBackend, RecordingSession, SessionOutcome, SessionOwner, StopReason,
};
use crate::transcription::{GatewayClient, Language};

/// Handles the `listen` command.
///
/// # Arguments
/// * `language` - Optional language override (two-letter code or BCP-47 tag)
/// * `raw` - Transcribe only; skip command dispatch
pub async fn handle_listen(language: Option<String>, raw: bool) -> Result<(), anyhow::Error> {
    tracing::info!("=== VoxLink Assistant Started ===");

    let mut config_data = VoxConfig::load_or_init().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow!(
            "Configuration error: {err}\n\nPlease check your ~/.config/voxlink/voxlink.toml file and try again."
        )
    })?;

    if !raw && !config_data.feedback.voice_commands {
        println!(
            "Voice commands are disabled for this profile. \
             Enable them via 'voxlink config' ([feedback] voice_commands)."
        );
        return Ok(());
    }

    let language = resolve_language(language.as_deref(), &config_data)?;

    // One Ctrl-C handler for the whole run; it cancels whichever capture is
    // currently active.
    let active_cancel: Arc<Mutex<Option<CancelHandle>>> = Arc::new(Mutex::new(None));
    {
        let active_cancel = Arc::clone(&active_cancel);
        ctrlc::set_handler(move || {
            if let Some(handle) = active_cancel.lock().unwrap().as_ref() {
                handle.cancel();
            }
        })
        .map_err(|e| anyhow!("Failed to register Ctrl-C handler: {e}"))?;
    }

    let Some(artifact) = capture_utterance(&config_data, &active_cancel).await? else {
        println!("Recording canceled.");
        return Ok(());
    };

    eprintln!("Processing...");
    let gateway = GatewayClient::new(config_data.gateway.transcribe_url.clone());
    let text = match gateway.transcribe(&artifact, language).await {
        Ok(text) => text,
        Err(e) => {
            // Remote trouble is a status line, not a crash; the assistant
            // is back to idle and the user just tries again.
            tracing::error!("Transcription failed: {e}");
            println!("Processing error: {e}");
            return Ok(());
        }
    };

    tracing::info!("Recognized: {}", text);
    println!("Recognized: {text}");

    if raw {
        save_history(&text, None);
        return Ok(());
    }

    let dispatcher = CommandDispatcher::new();
    let mut matched_action: Option<CommandAction> = None;
    let matched = dispatcher.dispatch(&text, |action| matched_action = Some(action));

    save_history(&text, matched_action.map(|a| a.id()));

    if !matched {
        println!("Command not recognized: \"{text}\"");
        return Ok(());
    }

    perform_action(
        matched_action.expect("dispatch reported a match"),
        &mut config_data,
        language,
        &active_cancel,
    )
    .await
}

/// Runs one capture to completion; `None` means the user canceled.
async fn capture_utterance(
    config: &VoxConfig,
    active_cancel: &Arc<Mutex<Option<CancelHandle>>>,
) -> anyhow::Result<Option<PathBuf>> {
    let owner = SessionOwner::new();
    let backend = CpalBackend::new(
        config.audio.sample_rate,
        config.audio.device.clone(),
        config.audio.output_format.clone(),
    );
    let mut session = RecordingSession::new(&owner, config.session.clone(), Box::new(backend));

    *active_cancel.lock().unwrap() = Some(session.cancel_handle());

    // SIGUSR1 stops the capture early and keeps the artifact, for external
    // triggers (window manager keybindings and the like).
    let sig_id = signal_hook::flag::register(signal_hook::consts::SIGUSR1, session.stop_flag())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    eprintln!("Listening... speak now (auto-stops on silence, Ctrl-C cancels)");
    let outcome = session.capture().await;

    signal_hook::low_level::unregister(sig_id);
    *active_cancel.lock().unwrap() = None;

    match outcome? {
        SessionOutcome::Canceled => Ok(None),
        SessionOutcome::Completed { artifact, reason } => {
            if reason == StopReason::MaxDuration {
                eprintln!("Recording hit the configured duration cap.");
            }
            Ok(Some(artifact))
        }
    }
}

/// Executes the matched assistant action.
async fn perform_action(
    action: CommandAction,
    config_data: &mut VoxConfig,
    language: Language,
    active_cancel: &Arc<Mutex<Option<CancelHandle>>>,
) -> anyhow::Result<()> {
    tracing::info!("Executing voice command: {}", action.id());

    match action {
        CommandAction::ToggleSound => {
            config_data.feedback.sound = !config_data.feedback.sound;
            config_data.save()?;
            println!(
                "Sound feedback {}.",
                if config_data.feedback.sound { "on" } else { "off" }
            );
        }
        CommandAction::ToggleVibration => {
            config_data.feedback.vibration = !config_data.feedback.vibration;
            config_data.save()?;
            println!(
                "Vibration feedback {}.",
                if config_data.feedback.vibration { "on" } else { "off" }
            );
        }
        CommandAction::OpenSettings => {
            super::config::handle_config()?;
        }
        CommandAction::OpenQuickMessages => {
            let book = Phrasebook::load(language)?;
            println!("Quick messages ({}):", language.display_name());
            for (i, phrase) in book.phrases().iter().enumerate() {
                println!("  {:2}. {phrase}", i + 1);
            }
            println!("Speak one with: voxlink quick <number>");
        }
        CommandAction::OpenSpeechToText => {
            run_dictation(config_data, language, active_cancel).await?;
        }
        CommandAction::OpenTextToSpeech => {
            println!("Speak text aloud with: voxlink say \"<text>\"");
        }
    }

    Ok(())
}

/// One dictation pass: capture another utterance and hand the transcript to
/// the user (stdout plus clipboard).
async fn run_dictation(
    config: &VoxConfig,
    language: Language,
    active_cancel: &Arc<Mutex<Option<CancelHandle>>>,
) -> anyhow::Result<()> {
    let Some(artifact) = capture_utterance(config, active_cancel).await? else {
        println!("Dictation canceled.");
        return Ok(());
    };

    eprintln!("Processing...");
    let gateway = GatewayClient::new(config.gateway.transcribe_url.clone());
    match gateway.transcribe(&artifact, language).await {
        Ok(text) => {
            println!("{text}");
            save_history(&text, None);
            if let Err(e) = copy_to_clipboard(&text) {
                tracing::warn!("Failed to copy dictation to clipboard: {e}");
            }
        }
        Err(e) => {
            tracing::error!("Dictation transcription failed: {e}");
            println!("Processing error: {e}");
        }
    }
    Ok(())
}

/// Stores a transcript in the history; history trouble is never fatal.
fn save_history(text: &str, command: Option<&str>) {
    match HistoryManager::open_default() {
        Ok(mut history) => {
            if let Err(e) = history.save(text, command) {
                tracing::warn!("Failed to save transcription to history: {}", e);
            }
        }
        Err(e) => tracing::warn!("History unavailable: {}", e),
    }
}

/// Picks the session language from the CLI override or the configuration.
pub(crate) fn resolve_language(
    override_code: Option<&str>,
    config: &VoxConfig,
) -> anyhow::Result<Language> {
    match override_code {
        Some(code) => Language::from_code(code).ok_or_else(|| {
            anyhow!("Unsupported language '{code}'. Supported: pt, en, es, fr")
        }),
        None => Ok(config.speech.language),
    }
}
