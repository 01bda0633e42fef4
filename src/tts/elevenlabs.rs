use super::config::TtsConfig;
use super::interface::{TtsError, TtsParams, TtsProvider};
use crate::utils::http::{is_auth_status, request_with_retry, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// ElevenLabs text-to-speech over REST.
///
/// `POST {base_url}/text-to-speech/{voice_id}?output_format=...` with the
/// key in the `xi-api-key` header. The response body is the encoded audio.
pub struct ElevenLabsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
    output_format: String,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct SynthRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsProvider {
    /// Returns `None` when no usable API key is configured.
    pub fn from_config(config: &TtsConfig) -> Option<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Some(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            output_format: config.output_format.clone(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
impl TtsProvider for ElevenLabsProvider {
    fn id(&self) -> String {
        "elevenlabs".to_string()
    }

    async fn synthesize(&self, text: &str, params: TtsParams) -> Result<Vec<u8>, TtsError> {
        let voice = params.voice.as_deref().unwrap_or(&self.voice_id);
        let model = params.model.as_deref().unwrap_or(&self.model_id);
        let format = params.output_format.as_deref().unwrap_or(&self.output_format);
        let url = format!("{}/text-to-speech/{}", self.base_url, voice);
        let body = SynthRequest {
            text,
            model_id: model,
        };

        let response = request_with_retry(
            || {
                self.client
                    .post(&url)
                    .query(&[("output_format", format)])
                    .header("xi-api-key", &self.api_key)
                    .header("Accept", "audio/mpeg")
                    .json(&body)
                    .send()
            },
            self.retry,
        )
        .await
        .map_err(|e| TtsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_auth_status(status) {
                return Err(TtsError::Auth(error_text));
            }
            return Err(TtsError::SynthesisFailed(format!(
                "elevenlabs returned {}: {}",
                status, error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TtsError::Network(format!("failed to read audio: {}", e)))?;
        if bytes.is_empty() {
            return Err(TtsError::SynthesisFailed("empty audio response".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> ElevenLabsProvider {
        let config = TtsConfig {
            api_key: Some("xi-test".to_string()),
            base_url: format!("{}/v1", server.uri()),
            ..TtsConfig::default()
        };
        ElevenLabsProvider::from_config(&config)
            .unwrap()
            .with_client(Client::builder().no_proxy().build().unwrap())
            .with_retry(RetryPolicy::immediate(0))
    }

    #[tokio::test]
    async fn posts_text_voice_model_and_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/bMxLr8fP6hzNRRi9nJxU"))
            .and(query_param("output_format", "mp3_44100_128"))
            .and(header("xi-api-key", "xi-test"))
            .and(body_json(serde_json::json!({
                "text": "Hello there!",
                "model_id": "eleven_flash_v2_5"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90, 0x00]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = provider_for(&server)
            .synthesize("Hello there!", TtsParams::default())
            .await
            .unwrap();
        assert_eq!(audio, vec![0xFF, 0xFB, 0x90, 0x00]);
    }

    #[tokio::test]
    async fn voice_override_changes_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/other-voice"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let params = TtsParams {
            voice: Some("other-voice".to_string()),
            ..TtsParams::default()
        };
        let audio = provider_for(&server).synthesize("hi", params).await.unwrap();
        assert_eq!(audio.len(), 3);
    }

    #[tokio::test]
    async fn forbidden_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .synthesize("hi", TtsParams::default())
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn no_key_means_no_provider() {
        let config = TtsConfig {
            api_key: None,
            api_key_env: Some("VAI_TEST_UNSET_XI_ENV".to_string()),
            ..TtsConfig::default()
        };
        assert!(ElevenLabsProvider::from_config(&config).is_none());
    }
}
