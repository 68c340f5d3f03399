//! Speak text aloud through the cloud synthesis pipeline.
//!
//! Translates the text into the target language (unless told not to),
//! synthesizes MP3 speech with the configured voice and rate, and plays it
//! through the system audio player, or writes it to a file instead.

use anyhow::anyhow;

use crate::config::{self, VoxConfig};
use crate::synthesis::{play_audio_file, TtsClient};
use crate::translate::TranslateClient;

/// Handles the `say` command.
///
/// # Arguments
/// * `text` - The text to speak
/// * `language` - Optional target language override
/// * `rate` - Optional speaking rate override (0.5 to 1.5)
/// * `output` - Write the MP3 here instead of playing it
/// * `no_translate` - Skip the translation step and synthesize the text as-is
pub async fn handle_say(
    text: String,
    language: Option<String>,
    rate: Option<f32>,
    output: Option<String>,
    no_translate: bool,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== VoxLink Say Command ===");

    let text = text.trim();
    if text.is_empty() {
        return Err(anyhow!("Nothing to say: the text is empty"));
    }

    let config_data = VoxConfig::load_or_init()?;
    let language = super::listen::resolve_language(language.as_deref(), &config_data)?;
    let rate = rate.unwrap_or(config_data.speech.speaking_rate);
    let api_key = config::require_api_key()?;

    let spoken_text = if no_translate {
        text.to_string()
    } else {
        let translator = TranslateClient::new(api_key.clone());
        translator.translate(text, language).await.map_err(|e| {
            tracing::error!("Translation failed: {e}");
            anyhow!("Translation failed: {e}")
        })?
    };

    let tts = TtsClient::new(api_key);
    let audio = tts
        .synthesize(&spoken_text, language, config_data.speech.voice, rate)
        .await
        .map_err(|e| {
            tracing::error!("Synthesis failed: {e}");
            anyhow!("Synthesis failed: {e}")
        })?;

    if let Some(output_path) = output {
        std::fs::write(&output_path, &audio)
            .map_err(|e| anyhow!("Failed to write '{output_path}': {e}"))?;
        println!("Saved speech to {output_path}");
        return Ok(());
    }

    let temp_mp3 = std::env::temp_dir().join(format!("voxlink-say-{}.mp3", std::process::id()));
    std::fs::write(&temp_mp3, &audio)
        .map_err(|e| anyhow!("Failed to write temporary audio: {e}"))?;

    let playback = play_audio_file(&temp_mp3);

    if let Err(e) = std::fs::remove_file(&temp_mp3) {
        tracing::debug!("Failed to remove temp audio: {}", e);
    }
    playback?;

    tracing::info!("Spoke {} chars in {}", spoken_text.chars().count(), language);
    Ok(())
}
