//! Speech-to-text configuration, the `stt` section of `companion_config.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    pub enabled: bool,

    /// Direct API key (takes precedence over env var)
    pub api_key: Option<String>,
    /// Environment variable name to read API key from
    pub api_key_env: Option<String>,
    /// Base URL of a Whisper-compatible API
    pub base_url: String,
    pub model: String,

    /// Optional language hint (BCP-47 code: "en", "ja", etc.)
    pub language: Option<String>,

    /// Ambient noise sampling before listening starts.
    pub calibration_ms: u64,
    /// Trailing silence that ends an utterance.
    pub pause_ms: u64,
    /// Hard cap on a single listen, including the wait for speech.
    pub max_listen_secs: u64,

    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            language: None,
            calibration_ms: 1000,
            pause_ms: 800,
            max_listen_secs: 15,
            timeout_secs: 30,
        }
    }
}

impl SttConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        crate::config::resolve_api_key(&self.api_key, &self.api_key_env)
    }

    pub fn is_usable(&self) -> bool {
        self.enabled && self.resolve_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_whisper() {
        let config = SttConfig::default();
        assert_eq!(config.model, "whisper-1");
        assert_eq!(config.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert!(config.pause_ms < config.max_listen_secs * 1000);
    }

    #[test]
    fn placeholder_key_is_not_usable() {
        let config = SttConfig {
            api_key: Some("(place key here)".to_string()),
            api_key_env: Some("VAI_TEST_UNSET_STT_ENV".to_string()),
            ..SttConfig::default()
        };
        assert!(!config.is_usable());
    }

    #[test]
    fn disabled_is_not_usable_even_with_key() {
        let config = SttConfig {
            enabled: false,
            api_key: Some("sk-real".to_string()),
            ..SttConfig::default()
        };
        assert!(!config.is_usable());
    }
}
