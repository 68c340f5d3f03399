//! Transcribe a pre-recorded audio file without capturing.
//!
//! Accepts an audio file path and sends it through the same gateway pipeline
//! as the `listen` command, minus the dispatch step.

use std::path::PathBuf;

use anyhow::anyhow;

use crate::clipboard::copy_to_clipboard;
use crate::config::VoxConfig;
use crate::history::HistoryManager;
use crate::transcription::GatewayClient;

/// Handles transcription of a pre-recorded audio file.
///
/// # Arguments
/// * `file` - Path to the audio file to transcribe
/// * `language` - Optional language override
/// * `clipboard` - If true, copy to clipboard instead of stdout
/// * `output_file` - Optional file path to write the transcript to
pub async fn handle_transcribe(
    file: PathBuf,
    language: Option<String>,
    clipboard: bool,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== VoxLink Transcribe Command ===");

    if !file.exists() {
        return Err(anyhow!("Audio file not found: {}", file.display()));
    }

    tracing::info!("Transcribing file: {}", file.display());

    let config_data = VoxConfig::load_or_init().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow!("Configuration error: {err}")
    })?;

    let language = super::listen::resolve_language(language.as_deref(), &config_data)?;

    let gateway = GatewayClient::new(config_data.gateway.transcribe_url.clone());
    let text = gateway.transcribe(&file, language).await.map_err(|e| {
        tracing::error!("Transcription failed: {e}");
        anyhow!("Transcription failed: {e}")
    })?;

    tracing::debug!("Transcription completed: {}", text);

    // Save to history with a pointer back to the source file
    match HistoryManager::open_default() {
        Ok(mut history) => {
            let note = format!("[{}] {text}", file.display());
            if let Err(e) = history.save(&note, None) {
                tracing::warn!("Failed to save transcription to history: {}", e);
            }
        }
        Err(e) => tracing::warn!("History unavailable: {}", e),
    }

    // Output destination: file > clipboard > stdout (default)
    if let Some(file_path) = output_file {
        std::fs::write(&file_path, &text)
            .map_err(|e| anyhow!("Failed to write to file '{file_path}': {e}"))?;
        tracing::debug!("Transcript written to file: {file_path}");
    } else if clipboard {
        if let Err(e) = copy_to_clipboard(&text) {
            tracing::warn!("Failed to copy to clipboard: {e}");
        } else {
            tracing::debug!("Transcript copied to clipboard");
        }
    } else {
        println!("{text}");
    }

    Ok(())
}
