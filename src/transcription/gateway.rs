//! Speech gateway client.
//!
//! Sends a captured audio artifact to the remote transcription endpoint and
//! returns the recognized text. The gateway accepts a JSON body carrying the
//! base64-encoded audio and a language hint, and answers with either a
//! `text` field or an `error` field.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Language;

/// Request body for the transcription endpoint.
#[derive(Debug, Serialize)]
struct TranscribeRequest {
    /// Base64-encoded audio payload
    audio: String,
    config: RecognitionConfig,
}

/// Language hint for recognition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    language_code: String,
    /// Fallback languages tried when the primary does not match the speech
    alternative_language_codes: Vec<String>,
}

/// Response from the transcription endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TranscribeResponse {
    pub(crate) text: Option<String>,
    pub(crate) error: Option<String>,
}

/// Client for the remote transcription gateway.
pub struct GatewayClient {
    url: String,
    client: reqwest::Client,
}

impl GatewayClient {
    /// Creates a client for the given transcription endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Transcribes an audio artifact.
    ///
    /// The primary language comes from configuration; the other supported
    /// languages ride along as alternatives so the gateway can fall back
    /// when the speaker switches language.
    ///
    /// # Errors
    /// - If the audio file cannot be read from disk
    /// - If the request fails (connection, timeout)
    /// - If the gateway returns an HTTP error or an error body
    /// - If the gateway returns no text
    pub async fn transcribe(&self, audio_path: &Path, language: Language) -> Result<String> {
        let audio_data = std::fs::read(audio_path)
            .map_err(|e| anyhow!("Failed to read audio file: {e}"))?;

        let request = TranscribeRequest {
            audio: BASE64.encode(&audio_data),
            config: RecognitionConfig {
                language_code: language.bcp47().to_string(),
                alternative_language_codes: language
                    .alternatives()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            },
        };

        tracing::debug!(
            "Transcribing {} ({} bytes) via {} with language {}",
            audio_path.display(),
            audio_data.len(),
            self.url,
            language.bcp47()
        );

        let response = match self.client.post(&self.url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the speech gateway. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to the speech gateway timed out. The service is not responding."
                        .to_string()
                } else {
                    format!("Speech gateway network error: {e}")
                };
                return Err(anyhow!(error_msg));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let human_readable = match status.as_u16() {
                400 => "The speech gateway rejected the audio payload.".to_string(),
                429 => "Too many requests to the speech gateway. Please wait and try again."
                    .to_string(),
                500..=504 => {
                    "The speech gateway is experiencing issues. Please try again later.".to_string()
                }
                _ => format!("Speech gateway error (status {status}): {error_body}"),
            };

            return Err(anyhow!(human_readable));
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse gateway response: {e}"))?;

        extract_text(body)
    }
}

/// Pulls the recognized text out of a gateway response.
///
/// An explicit error field, a missing text field, and an empty transcript
/// all count as transcription failure; the original app silently returned
/// an empty string here, which hid failures from the user.
pub(crate) fn extract_text(response: TranscribeResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(anyhow!("Speech gateway reported an error: {error}"));
    }

    match response.text {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(anyhow!("The speech gateway returned no text")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_trims_transcript() {
        let response: TranscribeResponse =
            serde_json::from_str(r#"{"text": "  ativar som \n"}"#).unwrap();
        assert_eq!(extract_text(response).unwrap(), "ativar som");
    }

    #[test]
    fn test_extract_text_surfaces_gateway_error() {
        let response: TranscribeResponse =
            serde_json::from_str(r#"{"error": "Base64 inválido"}"#).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("Base64 inválido"));
    }

    #[test]
    fn test_empty_transcript_is_a_failure() {
        let response: TranscribeResponse = serde_json::from_str(r#"{"text": "   "}"#).unwrap();
        assert!(extract_text(response).is_err());

        let response: TranscribeResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_text(response).is_err());
    }

    #[test]
    fn test_request_body_shape() {
        let request = TranscribeRequest {
            audio: "QUJD".to_string(),
            config: RecognitionConfig {
                language_code: Language::Pt.bcp47().to_string(),
                alternative_language_codes: Language::Pt
                    .alternatives()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["audio"], "QUJD");
        assert_eq!(json["config"]["languageCode"], "pt-PT");
        assert_eq!(
            json["config"]["alternativeLanguageCodes"],
            serde_json::json!(["en-US", "es-ES", "fr-FR"])
        );
    }
}
