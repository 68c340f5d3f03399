//! Translate text between the supported languages.

use anyhow::anyhow;

use crate::config;
use crate::transcription::Language;
use crate::translate::TranslateClient;

/// Handles the `translate` command: prints the translation to stdout.
///
/// # Arguments
/// * `text` - Text to translate
/// * `to` - Target language (two-letter code or BCP-47 tag)
pub async fn handle_translate(text: String, to: String) -> Result<(), anyhow::Error> {
    let target = Language::from_code(&to)
        .ok_or_else(|| anyhow!("Unsupported language '{to}'. Supported: pt, en, es, fr"))?;

    let api_key = config::require_api_key()?;
    let translator = TranslateClient::new(api_key);

    let translated = translator.translate(&text, target).await.map_err(|e| {
        tracing::error!("Translation failed: {e}");
        anyhow!("Translation failed: {e}")
    })?;

    println!("{translated}");
    Ok(())
}
