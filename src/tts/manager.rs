use super::config::TtsConfig;
use super::elevenlabs::ElevenLabsProvider;
use super::interface::{TtsError, TtsParams, TtsProvider};
use super::playback::{AudioOutput, RodioOutput};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Speaks replies aloud: synthesize remotely, then play locally.
///
/// Utterances go through a single-permit queue so two replies never play
/// over each other. `speak_detached` is fire-and-forget; failures are
/// logged and never reach the conversation.
#[derive(Clone)]
pub struct VoiceService {
    provider: Option<Arc<dyn TtsProvider>>,
    output: Arc<dyn AudioOutput>,
    queue: Arc<Semaphore>,
}

impl VoiceService {
    pub fn new(provider: Option<Arc<dyn TtsProvider>>, output: Arc<dyn AudioOutput>) -> Self {
        Self {
            provider,
            output,
            queue: Arc::new(Semaphore::new(1)),
        }
    }

    /// Voice output is skipped when disabled or when no key is configured.
    pub fn from_config(config: &TtsConfig) -> Self {
        let provider: Option<Arc<dyn TtsProvider>> = if config.is_usable() {
            tracing::info!(voice = %config.voice_id, model = %config.model_id, "voice output ready");
            ElevenLabsProvider::from_config(config).map(|p| Arc::new(p) as Arc<dyn TtsProvider>)
        } else if !config.enabled {
            tracing::info!("voice output disabled in config");
            None
        } else {
            tracing::warn!(
                env = config.api_key_env.as_deref().unwrap_or("ELEVENLABS_API_KEY"),
                "no voice API key, replies will not be spoken"
            );
            None
        };
        Self::new(provider, Arc::new(RodioOutput::new(config.volume)))
    }

    pub fn disabled() -> Self {
        Self::new(None, Arc::new(RodioOutput::default()))
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Synthesize and play `text`, waiting for playback to finish.
    pub async fn speak(&self, text: &str) -> Result<(), TtsError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| TtsError::Unavailable("no voice provider configured".to_string()))?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let _permit = self
            .queue
            .acquire()
            .await
            .map_err(|e| TtsError::Unavailable(format!("queue closed: {}", e)))?;

        let audio = provider.synthesize(text, TtsParams::default()).await?;
        tracing::debug!(provider = %provider.id(), bytes = audio.len(), "synthesized reply");

        let output = self.output.clone();
        tokio::task::spawn_blocking(move || output.play(audio))
            .await
            .map_err(|e| TtsError::Playback(format!("playback task failed: {}", e)))?
    }

    /// Speak in the background. Returns `None` when voice is off.
    pub fn speak_detached(&self, text: String) -> Option<JoinHandle<()>> {
        if !self.is_enabled() || text.trim().is_empty() {
            return None;
        }
        let service = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = service.speak(&text).await {
                if e.is_auth() {
                    tracing::error!(error = %e, "voice output failed");
                } else {
                    tracing::warn!(error = %e, "voice output failed");
                }
            }
        }))
    }
}
