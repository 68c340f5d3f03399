//! Cloud translation client.
//!
//! Thin wrapper over the Translate v2 REST endpoint, used to localize text
//! before synthesis and to translate transcripts. Authenticates with the
//! same API key as the synthesis service.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::transcription::Language;

const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Serialize)]
struct TranslateRequest {
    q: String,
    /// Two-letter target code ("pt", "en", …)
    target: String,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Client for the cloud translation endpoint.
pub struct TranslateClient {
    api_key: String,
    client: reqwest::Client,
}

impl TranslateClient {
    /// Creates a client authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Translates text into the target language.
    ///
    /// # Errors
    /// - If the request fails (connection, timeout)
    /// - If the endpoint rejects the key or the request
    /// - If the response carries no translation
    pub async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let request = TranslateRequest {
            q: text.to_string(),
            target: target.code().to_string(),
            format: "text",
        };

        let url = format!("{TRANSLATE_URL}?key={}", urlencoding::encode(&self.api_key));

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the translation service. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to the translation service timed out.".to_string()
                } else {
                    format!("Translation network error: {e}")
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
                401 | 403 => "The API key is invalid or lacks access to the translation service. \
                              Run 'voxlink auth' to update it."
                    .to_string(),
                429 => "Too many requests to the translation service. Please wait and try again."
                    .to_string(),
                500..=504 => {
                    "The translation service is experiencing issues. Please try again later."
                        .to_string()
                }
                _ => format!("Translation service error (status {status}): {error_body}"),
            };

            return Err(anyhow!(human_readable));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse translation response: {e}"))?;

        let translated = body
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| anyhow!("The translation service returned no translation"))?;

        tracing::debug!("Translated {} chars to {}", text.chars().count(), target);
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_two_letter_target() {
        let request = TranslateRequest {
            q: "preciso de ajuda".to_string(),
            target: Language::En.code().to_string(),
            format: "text",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "preciso de ajuda");
        assert_eq!(json["target"], "en");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn test_response_parsing() {
        let body: TranslateResponse = serde_json::from_str(
            r#"{"data": {"translations": [{"translatedText": "I need help"}]}}"#,
        )
        .unwrap();
        assert_eq!(body.data.translations[0].translated_text, "I need help");
    }
}
