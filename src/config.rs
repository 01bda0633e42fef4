//! Shared config utilities for loading JSON config files
//! and resolving API keys from fields or environment variables.
//!
//! Also defines the top-level `CompanionConfig` that aggregates every
//! subsystem's section into a single `companion_config.json`.

use crate::assets::AssetConfig;
use crate::llm::llm_config::LlmConfig;
use crate::stt::SttConfig;
use crate::tts::TtsConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "VAI_COMPANION_CONFIG";

/// Upper bound for `history.max_turns`.
pub const MAX_HISTORY_TURNS: usize = 1000;

const CONFIG_FILE_NAME: &str = "companion_config.json";
const APP_DIR_NAME: &str = "vai-companion";

/// Key values shipped in sample configs that must never reach a remote API.
const PLACEHOLDER_KEYS: &[&str] = &["(place key here)", "place key here", "your-api-key"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key for {service}: set `{env_var}` or `api_key` in {path}")]
    MissingCredential {
        service: &'static str,
        env_var: String,
        path: String,
    },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                tracing::info!(label, path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(
                    label,
                    path = %path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                T::default()
            }
        },
        Err(_) => {
            tracing::info!(label, path = %path.display(), "no config file, using defaults");
            T::default()
        }
    }
}

/// Resolve an API key: check the direct `api_key` field first,
/// then fall back to reading the environment variable named in `api_key_env`.
/// Empty and placeholder values count as unset.
pub fn resolve_api_key(api_key: &Option<String>, api_key_env: &Option<String>) -> Option<String> {
    if let Some(ref key) = api_key {
        if !is_placeholder(key) {
            return Some(key.clone());
        }
    }
    if let Some(ref env_var) = api_key_env {
        if let Ok(key) = std::env::var(env_var) {
            if !is_placeholder(&key) {
                return Some(key);
            }
        }
    }
    None
}

pub fn is_placeholder(key: &str) -> bool {
    let key = key.trim();
    key.is_empty()
        || PLACEHOLDER_KEYS
            .iter()
            .any(|p| key.eq_ignore_ascii_case(p))
}

// ── Character ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default = "default_character_name")]
    pub name: String,
    /// Replaces the built-in emotion-tag prompt when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_character_name() -> String {
    "Vai".to_string()
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            name: default_character_name(),
            system_prompt: None,
        }
    }
}

// ── History ────────────────────────────────────────────────

/// How the bounded history is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    /// One user message holding the whole transcript.
    #[default]
    Flattened,
    /// One chat message per turn.
    Messages,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default)]
    pub format: HistoryFormat,
}

fn default_max_turns() -> usize {
    20
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            format: HistoryFormat::default(),
        }
    }
}

// ── Top-Level Config ───────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub character: CharacterConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub stt: SttConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

impl CompanionConfig {
    /// Fail fast on settings the chat path cannot run without.
    ///
    /// Voice and speech input are optional: a missing key there only
    /// disables the channel (`VoiceService::from_config`, `SpeechInput::from_config`).
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if self.llm.resolve_api_key().is_none() {
            return Err(ConfigError::MissingCredential {
                service: "chat completion",
                env_var: self
                    .llm
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| "CEREBRAS_API_KEY".to_string()),
                path: path.display().to_string(),
            });
        }
        if self.history.max_turns == 0 {
            return Err(ConfigError::Invalid {
                field: "history.max_turns",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.history.max_turns > MAX_HISTORY_TURNS {
            return Err(ConfigError::Invalid {
                field: "history.max_turns",
                reason: format!("must be at most {}", MAX_HISTORY_TURNS),
            });
        }
        if self.character.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "character.name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Per-user data directory for the companion.
pub fn app_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Config file location: `$VAI_COMPANION_CONFIG`, else the app data dir.
pub fn config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => app_data_dir().join(CONFIG_FILE_NAME),
    }
}

/// Reads the optional config file. The file is never created or written.
pub fn load_config(path: &Path) -> CompanionConfig {
    load_json_config(path, "Config")
}
