//! Audio playback via rodio.
//!
//! Decodes the encoded audio returned by the voice service (MP3 by
//! default) and plays it through the default output device.

use super::interface::TtsError;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;

/// Something that can play an encoded audio clip to completion.
///
/// `play` blocks until the clip ends; callers run it on a blocking thread.
pub trait AudioOutput: Send + Sync {
    fn play(&self, audio: Vec<u8>) -> Result<(), TtsError>;
}

/// Default output device through rodio.
///
/// The output stream is opened per clip: rodio's `OutputStream` is not
/// `Send`, so it has to live on the thread that plays.
pub struct RodioOutput {
    volume: f32,
}

impl RodioOutput {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioOutput for RodioOutput {
    fn play(&self, audio: Vec<u8>) -> Result<(), TtsError> {
        if audio.is_empty() {
            return Ok(());
        }

        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| TtsError::Playback(format!("failed to open audio output: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| TtsError::Playback(format!("failed to create audio sink: {}", e)))?;
        let source = Decoder::new(Cursor::new(audio))
            .map_err(|e| TtsError::Playback(format!("failed to decode audio: {}", e)))?;

        sink.set_volume(self.volume);
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}
