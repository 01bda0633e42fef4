//! Emotion → artwork lookup.
//!
//! Each emotion owns one category folder. Resolving lists the eligible
//! files in that folder on every call and picks one uniformly at random,
//! so repeated lookups for the same emotion can show different art.

use super::config::AssetConfig;
use crate::ai::emotion::Emotion;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Static,
    Animated,
}

/// A displayable file belonging to exactly one emotion category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    emotion: Emotion,
    path: PathBuf,
    kind: AssetKind,
}

impl AssetHandle {
    pub fn new(emotion: Emotion, path: PathBuf) -> Self {
        let animated = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("gif"))
            .unwrap_or(false);
        Self {
            emotion,
            path,
            kind: if animated {
                AssetKind::Animated
            } else {
                AssetKind::Static
            },
        }
    }

    pub fn category(&self) -> Emotion {
        self.emotion
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Found(AssetHandle),
    /// The category has no eligible files (or no folder at all).
    NotFound,
}

impl ResolveOutcome {
    pub fn into_option(self) -> Option<AssetHandle> {
        match self {
            ResolveOutcome::Found(handle) => Some(handle),
            ResolveOutcome::NotFound => None,
        }
    }
}

pub trait AssetResolver: Send + Sync {
    fn resolve(&self, emotion: Emotion) -> ResolveOutcome;
}

/// Resolves artwork from `assets/<emotion>/` style folders on disk.
#[derive(Debug, Clone)]
pub struct DirectoryAssetResolver {
    config: AssetConfig,
}

impl DirectoryAssetResolver {
    pub fn new(config: AssetConfig) -> Self {
        Self { config }
    }

    /// Eligible files in the emotion's folder, sorted by path.
    pub fn list(&self, emotion: Emotion) -> Vec<PathBuf> {
        let dir = self.config.category_dir(emotion);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(%emotion, dir = %dir.display(), error = %e, "missing asset folder");
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| self.config.is_eligible(n))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    pub fn resolve_with<R: Rng + ?Sized>(&self, emotion: Emotion, rng: &mut R) -> ResolveOutcome {
        let files = self.list(emotion);
        match files.choose(rng) {
            Some(path) => ResolveOutcome::Found(AssetHandle::new(emotion, path.clone())),
            None => {
                tracing::warn!(%emotion, "no artwork for emotion, keeping current asset");
                ResolveOutcome::NotFound
            }
        }
    }
}

impl AssetResolver for DirectoryAssetResolver {
    fn resolve(&self, emotion: Emotion) -> ResolveOutcome {
        self.resolve_with(emotion, &mut rand::thread_rng())
    }
}
