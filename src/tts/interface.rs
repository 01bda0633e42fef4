use async_trait::async_trait;
use thiserror::Error;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("voice service unreachable: {0}")]
    Network(String),
    #[error("voice service rejected the API key: {0}")]
    Auth(String),
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("audio playback failed: {0}")]
    Playback(String),
    #[error("voice output unavailable: {0}")]
    Unavailable(String),
}

impl TtsError {
    pub fn is_auth(&self) -> bool {
        matches!(self, TtsError::Auth(_))
    }
}

// ── Synthesis Parameters ───────────────────────────────

/// Per-request overrides. `None` uses the provider's configured value.
#[derive(Debug, Clone, Default)]
pub struct TtsParams {
    pub voice: Option<String>,
    pub model: Option<String>,
    pub output_format: Option<String>,
}

// ── Provider Trait ──────────────────────────────────────

#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Unique identifier for this provider (e.g. "elevenlabs")
    fn id(&self) -> String;

    /// Synthesize text to encoded audio bytes (MP3 by default).
    async fn synthesize(&self, text: &str, params: TtsParams) -> Result<Vec<u8>, TtsError>;
}
