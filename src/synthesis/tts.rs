//! Cloud text-to-speech client.
//!
//! Synthesizes MP3 speech through the Google Cloud TTS REST endpoint. The
//! request carries the text, a language/voice pair and the speaking rate;
//! the response carries the audio as base64.

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::transcription::{Language, VoicePreference};

const SYNTHESIZE_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Request body for the synthesis endpoint.
#[derive(Debug, Serialize)]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    audio_config: AudioOutputConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioOutputConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
}

/// Response from the synthesis endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Client for the cloud text-to-speech endpoint.
pub struct TtsClient {
    api_key: String,
    client: reqwest::Client,
}

impl TtsClient {
    /// Creates a client authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Synthesizes the text and returns the MP3 bytes.
    ///
    /// # Errors
    /// - If the request fails (connection, timeout)
    /// - If the endpoint rejects the key or the request
    /// - If the response audio cannot be decoded
    pub async fn synthesize(
        &self,
        text: &str,
        language: Language,
        voice: VoicePreference,
        speaking_rate: f32,
    ) -> Result<Vec<u8>> {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: language.bcp47().to_string(),
                name: language.voice_name(voice).to_string(),
            },
            audio_config: AudioOutputConfig {
                audio_encoding: "MP3",
                speaking_rate: speaking_rate.clamp(0.5, 1.5),
            },
        };

        tracing::debug!(
            "Synthesizing {} chars as {} at rate {}",
            text.chars().count(),
            language.voice_name(voice),
            speaking_rate
        );

        let url = format!("{SYNTHESIZE_URL}?key={}", urlencoding::encode(&self.api_key));

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error_msg = if e.is_connect() {
                    "Failed to connect to the synthesis service. Check your internet connection."
                        .to_string()
                } else if e.is_timeout() {
                    "Request to the synthesis service timed out.".to_string()
                } else {
                    format!("Synthesis network error: {e}")
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
                400 => format!("The synthesis service rejected the request: {error_body}"),
                401 | 403 => "The API key is invalid or lacks access to the synthesis service. \
                              Run 'voxlink auth' to update it."
                    .to_string(),
                429 => "Too many requests to the synthesis service. Please wait and try again."
                    .to_string(),
                500..=504 => "The synthesis service is experiencing issues. Please try again later."
                    .to_string(),
                _ => format!("Synthesis service error (status {status}): {error_body}"),
            };

            return Err(anyhow!(human_readable));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse synthesis response: {e}"))?;

        let audio = BASE64
            .decode(body.audio_content.as_bytes())
            .map_err(|e| anyhow!("Synthesis response carried invalid audio data: {e}"))?;

        tracing::debug!("Synthesized {} bytes of MP3", audio.len());
        Ok(audio)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                text: "olá".to_string(),
            },
            voice: VoiceSelection {
                language_code: Language::Pt.bcp47().to_string(),
                name: Language::Pt.voice_name(VoicePreference::Feminine).to_string(),
            },
            audio_config: AudioOutputConfig {
                audio_encoding: "MP3",
                speaking_rate: 1.25,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["input"]["text"], "olá");
        assert_eq!(json["voice"]["languageCode"], "pt-PT");
        assert_eq!(json["voice"]["name"], "pt-PT-Standard-A");
        assert_eq!(json["audioConfig"]["audioEncoding"], "MP3");
        assert_eq!(json["audioConfig"]["speakingRate"], 1.25);
    }

    #[test]
    fn test_response_audio_decodes() {
        let body: SynthesizeResponse =
            serde_json::from_str(r#"{"audioContent": "SUQzBAA="}"#).unwrap();
        let audio = BASE64.decode(body.audio_content.as_bytes()).unwrap();
        assert_eq!(&audio[..3], b"ID3");
    }
}
