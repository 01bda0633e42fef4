//! STT engine interface & core types.

use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Arc;

/// A captured utterance (mono f32 PCM).
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Normalized audio samples (-1.0 to 1.0)
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
        }
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f32 / self.sample_rate as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode as a 16-bit PCM mono WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, SttError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.samples.len() * 2));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| SttError::Audio(format!("wav header: {}", e)))?;
            for &sample in self.samples.iter() {
                let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(pcm)
                    .map_err(|e| SttError::Audio(format!("wav write: {}", e)))?;
            }
            writer
                .finalize()
                .map_err(|e| SttError::Audio(format!("wav finalize: {}", e)))?;
        }
        Ok(cursor.into_inner())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SttError {
    #[error("speech service unreachable: {0}")]
    Network(String),
    #[error("speech service rejected credentials: {0}")]
    Auth(String),
    #[error("recognition failed: {0}")]
    Recognition(String),
    #[error("microphone error: {0}")]
    Audio(String),
    /// Nothing above the speech threshold before the listen window closed.
    #[error("no speech detected")]
    NoSpeech,
}

impl SttError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SttError::Auth(_))
    }
}

/// Abstract interface for any STT backend.
#[async_trait]
pub trait SttEngine: Send + Sync {
    fn id(&self) -> String;

    async fn transcribe(&self, clip: &AudioClip, language: Option<&str>)
        -> Result<String, SttError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_round_trips_through_hound() {
        let clip = AudioClip::new(vec![0.0, 0.5, -0.5, 1.5], 16_000);
        let bytes = clip.to_wav_bytes().unwrap();
        assert_eq!(&bytes[..4], b"RIFF");

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0);
        assert_eq!(samples[3], i16::MAX);
    }

    #[test]
    fn duration_from_rate() {
        let clip = AudioClip::new(vec![0.0; 8_000], 16_000);
        assert!((clip.duration_seconds() - 0.5).abs() < f32::EPSILON);
        assert_eq!(AudioClip::new(Vec::new(), 0).duration_seconds(), 0.0);
    }
}
