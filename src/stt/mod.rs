pub mod capture;
pub mod config;
pub mod interface;
pub mod openai;
pub mod service;

pub use capture::{CpalMicrophone, ListenSettings, Microphone};
pub use config::SttConfig;
pub use interface::{AudioClip, SttEngine, SttError};
pub use service::SpeechInput;
