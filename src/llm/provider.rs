//! LLM Provider trait — common interface for chat backends.

use async_trait::async_trait;

pub use crate::llm::openai::{LlmError, Message};
use crate::llm::openai::OpenAIClient;

// ── Common Parameters ──────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct LlmParams {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

/// Common interface for chat-completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(
        &self,
        messages: Vec<Message>,
        options: Option<LlmParams>,
    ) -> Result<String, LlmError>;

    /// Provider identifier, used in logs.
    fn id(&self) -> &str;
}

#[async_trait]
impl LlmProvider for OpenAIClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        options: Option<LlmParams>,
    ) -> Result<String, LlmError> {
        OpenAIClient::chat(self, messages, options).await
    }

    fn id(&self) -> &str {
        self.model()
    }
}
