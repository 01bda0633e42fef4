//! Speech input: listen once, transcribe, hand back text.

use super::capture::{CpalMicrophone, ListenSettings, Microphone};
use super::config::SttConfig;
use super::interface::{SttEngine, SttError};
use super::openai::OpenAIWhisperProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct SpeechInput {
    engine: Option<Arc<dyn SttEngine>>,
    microphone: Arc<dyn Microphone>,
    settings: ListenSettings,
    language: Option<String>,
}

impl SpeechInput {
    pub fn new(
        engine: Option<Arc<dyn SttEngine>>,
        microphone: Arc<dyn Microphone>,
        config: &SttConfig,
    ) -> Self {
        Self {
            engine,
            microphone,
            settings: ListenSettings::from(config),
            language: config.language.clone(),
        }
    }

    pub fn from_config(config: &SttConfig) -> Self {
        let engine: Option<Arc<dyn SttEngine>> = if config.is_usable() {
            tracing::info!(model = %config.model, "speech input ready");
            OpenAIWhisperProvider::from_config(config).map(|p| Arc::new(p) as Arc<dyn SttEngine>)
        } else if !config.enabled {
            tracing::info!("speech input disabled in config");
            None
        } else {
            tracing::warn!(
                env = config.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY"),
                "no speech API key, /mic is unavailable"
            );
            None
        };
        Self::new(engine, Arc::new(CpalMicrophone), config)
    }

    pub fn is_enabled(&self) -> bool {
        self.engine.is_some()
    }

    /// Record one utterance and transcribe it.
    pub async fn try_listen(&self) -> Result<String, SttError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| SttError::Recognition("speech input is not configured".to_string()))?;

        let microphone = self.microphone.clone();
        let settings = self.settings;
        let clip = tokio::task::spawn_blocking(move || microphone.record(settings))
            .await
            .map_err(|e| SttError::Audio(format!("capture task failed: {}", e)))??;
        tracing::debug!(seconds = clip.duration_seconds(), "captured utterance");

        engine.transcribe(&clip, self.language.as_deref()).await
    }

    /// Like `try_listen`, but any failure becomes an empty string.
    pub async fn listen(&self) -> String {
        match self.try_listen().await {
            Ok(text) => text,
            Err(SttError::NoSpeech) => {
                tracing::info!("no speech detected");
                String::new()
            }
            Err(e) if e.is_auth() => {
                tracing::error!(error = %e, "speech recognition failed");
                String::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::interface::AudioClip;
    use async_trait::async_trait;

    struct CannedMic(Option<Vec<f32>>);

    impl Microphone for CannedMic {
        fn record(&self, _settings: ListenSettings) -> Result<AudioClip, SttError> {
            match &self.0 {
                Some(samples) => Ok(AudioClip::new(samples.clone(), 16_000)),
                None => Err(SttError::NoSpeech),
            }
        }
    }

    struct EchoEngine(Result<String, SttError>);

    #[async_trait]
    impl SttEngine for EchoEngine {
        fn id(&self) -> String {
            "echo".to_string()
        }

        async fn transcribe(
            &self,
            _clip: &AudioClip,
            _language: Option<&str>,
        ) -> Result<String, SttError> {
            self.0.clone()
        }
    }

    fn input(mic: CannedMic, engine: Option<EchoEngine>) -> SpeechInput {
        let engine = engine.map(|e| Arc::new(e) as Arc<dyn SttEngine>);
        SpeechInput::new(engine, Arc::new(mic), &SttConfig::default())
    }

    #[tokio::test]
    async fn listen_returns_transcription() {
        let speech = input(
            CannedMic(Some(vec![0.2; 160])),
            Some(EchoEngine(Ok("good morning".to_string()))),
        );
        assert_eq!(speech.listen().await, "good morning");
    }

    #[tokio::test]
    async fn failures_collapse_to_empty_text() {
        let silent = input(CannedMic(None), Some(EchoEngine(Ok("unused".to_string()))));
        assert_eq!(silent.listen().await, "");

        let broken = input(
            CannedMic(Some(vec![0.2; 160])),
            Some(EchoEngine(Err(SttError::Network("offline".to_string())))),
        );
        assert_eq!(broken.listen().await, "");
    }

    #[tokio::test]
    async fn unconfigured_engine_is_disabled() {
        let speech = input(CannedMic(Some(vec![0.2; 160])), None);
        assert!(!speech.is_enabled());
        assert_eq!(speech.listen().await, "");
    }

    #[test]
    fn from_config_follows_usable_settings() {
        let mut config = SttConfig {
            api_key: Some("sk-real".to_string()),
            api_key_env: None,
            ..SttConfig::default()
        };
        assert!(SpeechInput::from_config(&config).is_enabled());

        config.enabled = false;
        assert!(!SpeechInput::from_config(&config).is_enabled());

        config.enabled = true;
        config.api_key = None;
        assert!(!SpeechInput::from_config(&config).is_enabled());
    }
}
