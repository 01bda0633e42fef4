//! Whisper-compatible STT provider.
//!
//! Uses the audio transcription API (`/audio/transcriptions`) with
//! `response_format=text`, so the body is the bare transcription.

use super::config::SttConfig;
use super::interface::{AudioClip, SttEngine, SttError};
use crate::utils::http::{is_auth_status, request_with_retry, RetryPolicy};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use std::time::Duration;

pub struct OpenAIWhisperProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAIWhisperProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| "whisper-1".to_string()),
            retry: RetryPolicy::new(1),
        }
    }

    /// Returns `None` when no usable API key is configured.
    pub fn from_config(config: &SttConfig) -> Option<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Some(
            Self::new(
                api_key,
                Some(config.base_url.clone()),
                Some(config.model.clone()),
            )
            .with_client(client),
        )
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn form(&self, wav: &[u8], language: Option<&str>) -> multipart::Form {
        let file_part = multipart::Part::bytes(wav.to_vec()).file_name("audio.wav");

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "text".to_string());

        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }
        form
    }
}

#[async_trait]
impl SttEngine for OpenAIWhisperProvider {
    fn id(&self) -> String {
        "openai_whisper".to_string()
    }

    async fn transcribe(
        &self,
        clip: &AudioClip,
        language: Option<&str>,
    ) -> Result<String, SttError> {
        if clip.is_empty() {
            return Err(SttError::NoSpeech);
        }
        let wav = clip.to_wav_bytes()?;
        let url = format!("{}/audio/transcriptions", self.base_url);

        // Multipart forms are consumed on send, so each attempt rebuilds one.
        let response = request_with_retry(
            || {
                self.client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .multipart(self.form(&wav, language))
                    .send()
            },
            self.retry,
        )
        .await
        .map_err(|e| SttError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            if is_auth_status(status) {
                return Err(SttError::Auth(body));
            }
            return Err(SttError::Recognition(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SttError::Network(format!("failed to read response: {}", e)))?;

        Ok(text.trim().to_string())
    }
}
