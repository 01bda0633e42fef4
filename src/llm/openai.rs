use super::llm_config::LlmConfig;
use super::provider::LlmParams;
use crate::utils::http::{is_auth_status, request_with_retry, RetryPolicy};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("chat service unreachable: {0}")]
    Network(String),
    #[error("chat service rejected the API key: {0}")]
    Auth(String),
    #[error("chat service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected chat response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    pub fn is_auth(&self) -> bool {
        matches!(self, LlmError::Auth(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text("user", content)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (Cerebras by default).
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    defaults: LlmParams,
}

impl OpenAIClient {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.cerebras.ai/v1".to_string()),
            model: model.unwrap_or_else(|| "llama-4-scout-17b-16e-instruct".to_string()),
            retry: RetryPolicy::default(),
            defaults: LlmParams::default(),
        }
    }

    /// Build from config. The caller is expected to have validated the key.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: config.resolve_api_key().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            retry: RetryPolicy::new(config.max_retries),
            defaults: LlmParams {
                temperature: config.temperature,
                max_tokens: config.max_tokens,
                top_p: None,
            },
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Non-streaming chat completion. Returns the first choice's text, trimmed.
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        options: Option<LlmParams>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let opts = options.unwrap_or_else(|| self.defaults.clone());
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            temperature: opts.temperature.or(self.defaults.temperature),
            max_tokens: opts.max_tokens.or(self.defaults.max_tokens),
            top_p: opts.top_p,
        };

        let response = request_with_retry(
            || {
                self.client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
            },
            self.retry,
        )
        .await
        .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_auth_status(status) {
                return Err(LlmError::Auth(error_text));
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse body: {}", e)))?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}
