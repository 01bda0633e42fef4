pub mod config;
pub mod elevenlabs;
pub mod interface;
pub mod manager;
pub mod playback;

pub use config::TtsConfig;
pub use interface::{TtsError, TtsParams, TtsProvider};
pub use manager::VoiceService;
pub use playback::{AudioOutput, RodioOutput};
