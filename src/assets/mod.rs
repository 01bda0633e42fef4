pub mod config;
pub mod resolver;

pub use config::AssetConfig;
pub use resolver::{AssetHandle, AssetKind, AssetResolver, DirectoryAssetResolver, ResolveOutcome};
