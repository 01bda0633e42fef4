//! Artwork location settings (`assets` section of the companion config).

use crate::ai::emotion::Emotion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Folder holding one sub-folder per emotion.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Per-emotion folder overrides, relative to `root`.
    #[serde(default)]
    pub directories: HashMap<Emotion, PathBuf>,
    /// File extensions eligible for display, without the dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_extensions() -> Vec<String> {
    vec!["png".to_string(), "gif".to_string()]
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            directories: HashMap::new(),
            extensions: default_extensions(),
        }
    }
}

impl AssetConfig {
    /// The category folder bound to an emotion, `root/<emotion>` unless overridden.
    pub fn category_dir(&self, emotion: Emotion) -> PathBuf {
        match self.directories.get(&emotion) {
            Some(dir) => self.root.join(dir),
            None => self.root.join(emotion.as_str()),
        }
    }

    pub fn is_eligible(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_uses_emotion_names() {
        let config = AssetConfig::default();
        assert_eq!(
            config.category_dir(Emotion::Confused),
            PathBuf::from("assets").join("confused")
        );
    }

    #[test]
    fn overrides_are_relative_to_root() {
        let mut config = AssetConfig::default();
        config
            .directories
            .insert(Emotion::Thinking, PathBuf::from("ponder"));
        assert_eq!(
            config.category_dir(Emotion::Thinking),
            PathBuf::from("assets").join("ponder")
        );
    }

    #[test]
    fn extension_check_ignores_case() {
        let config = AssetConfig::default();
        assert!(config.is_eligible("smile.PNG"));
        assert!(config.is_eligible("wave.gif"));
        assert!(!config.is_eligible("notes.txt"));
        assert!(!config.is_eligible("png"));
    }

    #[test]
    fn directories_deserialize_by_emotion_name() {
        let config: AssetConfig =
            serde_json::from_str(r#"{ "root": "art", "directories": { "sad": "blue" } }"#)
                .unwrap();
        assert_eq!(
            config.category_dir(Emotion::Sad),
            PathBuf::from("art").join("blue")
        );
        assert_eq!(config.extensions, vec!["png", "gif"]);
    }
}
