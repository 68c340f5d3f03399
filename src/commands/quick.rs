//! Quick-message listing and speaking.
//!
//! Without an index, prints the numbered phrasebook for the active language.
//! With an index, speaks that phrase through the synthesis pipeline. The
//! phrases are already localized, so no translation step is involved.

use anyhow::anyhow;

use crate::config::{self, VoxConfig};
use crate::quick::{user_phrases_path, Phrasebook};
use crate::synthesis::{play_audio_file, TtsClient};

/// Handles the `quick` command.
///
/// # Arguments
/// * `index` - Phrase number to speak (1-based); lists all phrases if absent
/// * `language` - Optional language override
pub async fn handle_quick(
    index: Option<usize>,
    language: Option<String>,
) -> Result<(), anyhow::Error> {
    let config_data = VoxConfig::load_or_init()?;
    let language = super::listen::resolve_language(language.as_deref(), &config_data)?;

    let book = Phrasebook::load(language)?;

    let Some(index) = index else {
        println!("Quick messages ({}):", language.display_name());
        for (i, phrase) in book.phrases().iter().enumerate() {
            println!("  {:2}. {phrase}", i + 1);
        }
        if let Ok(path) = user_phrases_path() {
            println!();
            println!("Add your own phrases, one per line, in {}", path.display());
        }
        return Ok(());
    };

    let phrase = book.get(index).ok_or_else(|| {
        anyhow!(
            "Quick message index out of range. Available messages: 1-{}",
            book.phrases().len()
        )
    })?;

    tracing::info!("Speaking quick message #{index}: {phrase}");
    println!("{phrase}");

    let api_key = config::require_api_key()?;
    let tts = TtsClient::new(api_key);
    let audio = tts
        .synthesize(
            phrase,
            language,
            config_data.speech.voice,
            config_data.speech.speaking_rate,
        )
        .await
        .map_err(|e| {
            tracing::error!("Synthesis failed: {e}");
            anyhow!("Synthesis failed: {e}")
        })?;

    let temp_mp3 = std::env::temp_dir().join(format!("voxlink-quick-{}.mp3", std::process::id()));
    std::fs::write(&temp_mp3, &audio)
        .map_err(|e| anyhow!("Failed to write temporary audio: {e}"))?;

    let playback = play_audio_file(&temp_mp3);

    if let Err(e) = std::fs::remove_file(&temp_mp3) {
        tracing::debug!("Failed to remove temp audio: {}", e);
    }
    playback
}
