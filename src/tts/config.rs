use serde::{Deserialize, Serialize};

/// Text-to-speech settings (`tts` section of the companion config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// ElevenLabs `output_format` query value.
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Playback volume, 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TtsConfig {
    /// Resolve the API key: check `api_key` field first, then `api_key_env` environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        crate::config::resolve_api_key(&self.api_key, &self.api_key_env)
    }

    /// Voice output runs only when enabled and a real key is present.
    pub fn is_usable(&self) -> bool {
        self.enabled && self.resolve_api_key().is_some()
    }
}

fn default_true() -> bool {
    true
}

fn default_api_key_env() -> Option<String> {
    Some("ELEVENLABS_API_KEY".to_string())
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

fn default_voice_id() -> String {
    "bMxLr8fP6hzNRRi9nJxU".to_string()
}

fn default_model_id() -> String {
    "eleven_flash_v2_5".to_string()
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_volume() -> f32 {
    1.0
}

fn default_max_retries() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            output_format: default_output_format(),
            volume: default_volume(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_voice_is_not_usable() {
        let config = TtsConfig {
            enabled: false,
            api_key: Some("xi-real".to_string()),
            ..TtsConfig::default()
        };
        assert!(!config.is_usable());
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let config = TtsConfig {
            api_key: Some("Place Key Here".to_string()),
            api_key_env: Some("VAI_TEST_UNSET_TTS_ENV".to_string()),
            ..TtsConfig::default()
        };
        assert!(!config.is_usable());
    }
}
