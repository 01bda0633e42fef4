pub mod llm_config;
pub mod openai;
pub mod provider;

pub use llm_config::LlmConfig;
pub use openai::{LlmError, Message, OpenAIClient};
pub use provider::{LlmParams, LlmProvider};
