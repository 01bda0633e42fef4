//! One conversational turn: history snapshot in, parsed reply out.
//!
//! Runs on the worker task. It only reads the snapshot it is handed;
//! appending the reply to history is the event loop's job.

use super::context::HistorySnapshot;
use super::emotion::{parse_reply, ParsedReply};
use super::prompts::emotion_tag_prompt;
use crate::config::{CharacterConfig, HistoryFormat};
use crate::llm::{LlmError, LlmProvider, Message};
use std::sync::Arc;

#[derive(Clone)]
pub struct TurnPipeline {
    provider: Arc<dyn LlmProvider>,
    character_name: String,
    system_prompt: String,
    format: HistoryFormat,
}

impl TurnPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        character: &CharacterConfig,
        format: HistoryFormat,
    ) -> Self {
        let system_prompt = character
            .system_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| emotion_tag_prompt(&character.name));
        Self {
            provider,
            character_name: character.name.clone(),
            system_prompt,
            format,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn build_messages(&self, snapshot: &HistorySnapshot) -> Vec<Message> {
        let mut messages = vec![Message::system(self.system_prompt.clone())];
        match self.format {
            HistoryFormat::Flattened => {
                messages.push(Message::user(snapshot.to_transcript(&self.character_name)));
            }
            HistoryFormat::Messages => messages.extend(snapshot.to_messages()),
        }
        messages
    }

    /// Raw model reply, whitespace-trimmed, tag not yet parsed.
    pub async fn complete(&self, snapshot: &HistorySnapshot) -> Result<String, LlmError> {
        let messages = self.build_messages(snapshot);
        tracing::debug!(
            provider = %self.provider.id(),
            turns = snapshot.turns().len(),
            "requesting completion"
        );
        let raw = self.provider.chat(messages, None).await?;
        Ok(raw.trim().to_string())
    }

    pub async fn run(&self, snapshot: &HistorySnapshot) -> Result<ParsedReply, LlmError> {
        let raw = self.complete(snapshot).await?;
        let parsed = parse_reply(&raw);
        if let Some(anomaly) = &parsed.anomaly {
            tracing::info!(%anomaly, "reply had no valid emotion tag, using neutral");
        }
        Ok(parsed)
    }
}
