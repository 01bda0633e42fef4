//! Microphone capture via cpal.
//!
//! One listen is: sample ambient noise to pick an energy threshold, wait for
//! speech above it, then record until enough trailing silence (or the
//! listen window runs out). Energy is mean absolute amplitude per chunk.

use super::config::SttConfig;
use super::interface::{AudioClip, SttError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Speech threshold relative to the calibrated ambient level.
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Lowest threshold, so a silent room does not trigger on hiss.
const MIN_THRESHOLD: f32 = 0.01;

/// Mean absolute amplitude of a chunk.
pub fn energy(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum: f32 = chunk.iter().map(|s| s.abs()).sum();
    sum / chunk.len() as f32
}

/// Down-mix interleaved audio to mono by averaging channels.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let ch = channels as usize;
    samples
        .chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ListenSettings {
    pub calibration: Duration,
    pub pause: Duration,
    pub max_listen: Duration,
}

impl From<&SttConfig> for ListenSettings {
    fn from(config: &SttConfig) -> Self {
        Self {
            calibration: Duration::from_millis(config.calibration_ms),
            pause: Duration::from_millis(config.pause_ms),
            max_listen: Duration::from_secs(config.max_listen_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Calibrating,
    WaitingForSpeech,
    Speaking,
    Done,
}

/// Energy-threshold endpointing over a stream of mono chunks.
#[derive(Debug)]
pub struct EnergyGate {
    phase: GatePhase,
    threshold: f32,
    calibration_samples: usize,
    pause_samples: usize,
    max_samples: usize,
    ambient_sum: f32,
    ambient_seen: usize,
    total_seen: usize,
    silence_run: usize,
    recorded: Vec<f32>,
}

fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * sample_rate as f64).round() as usize
}

impl EnergyGate {
    pub fn new(settings: ListenSettings, sample_rate: u32) -> Self {
        let calibration_samples = samples_for(settings.calibration, sample_rate);
        Self {
            phase: if calibration_samples == 0 {
                GatePhase::WaitingForSpeech
            } else {
                GatePhase::Calibrating
            },
            threshold: MIN_THRESHOLD,
            calibration_samples,
            pause_samples: samples_for(settings.pause, sample_rate).max(1),
            max_samples: samples_for(settings.calibration + settings.max_listen, sample_rate),
            ambient_sum: 0.0,
            ambient_seen: 0,
            total_seen: 0,
            silence_run: 0,
            recorded: Vec::new(),
        }
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn feed(&mut self, chunk: &[f32]) -> GatePhase {
        if self.phase == GatePhase::Done || chunk.is_empty() {
            return self.phase;
        }
        self.total_seen += chunk.len();
        let level = energy(chunk);

        match self.phase {
            GatePhase::Calibrating => {
                self.ambient_sum += level * chunk.len() as f32;
                self.ambient_seen += chunk.len();
                if self.ambient_seen >= self.calibration_samples {
                    let ambient = self.ambient_sum / self.ambient_seen as f32;
                    self.threshold = (ambient * AMBIENT_MULTIPLIER).max(MIN_THRESHOLD);
                    tracing::debug!(ambient, threshold = self.threshold, "calibrated microphone");
                    self.phase = GatePhase::WaitingForSpeech;
                }
            }
            GatePhase::WaitingForSpeech => {
                if level > self.threshold {
                    self.recorded.extend_from_slice(chunk);
                    self.phase = GatePhase::Speaking;
                }
            }
            GatePhase::Speaking => {
                self.recorded.extend_from_slice(chunk);
                if level > self.threshold {
                    self.silence_run = 0;
                } else {
                    self.silence_run += chunk.len();
                    if self.silence_run >= self.pause_samples {
                        self.phase = GatePhase::Done;
                    }
                }
            }
            GatePhase::Done => {}
        }

        if self.max_samples > 0 && self.total_seen >= self.max_samples {
            self.phase = GatePhase::Done;
        }
        self.phase
    }

    /// The recorded utterance; empty if speech never started.
    pub fn into_samples(self) -> Vec<f32> {
        self.recorded
    }
}

/// A blocking microphone. `record` returns one utterance.
pub trait Microphone: Send + Sync {
    fn record(&self, settings: ListenSettings) -> Result<AudioClip, SttError>;
}

/// The system default input device.
#[derive(Debug, Default)]
pub struct CpalMicrophone;

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: mpsc::Sender<Vec<f32>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels;
    device.build_input_stream(
        config,
        move |data: &[T], _info: &cpal::InputCallbackInfo| {
            let samples: Vec<f32> = data
                .iter()
                .map(|&s| <f32 as cpal::FromSample<T>>::from_sample_(s))
                .collect();
            // Receiver gone means the listen is over.
            let _ = tx.send(to_mono(&samples, channels));
        },
        |err| tracing::error!(error = %err, "audio input stream error"),
        None,
    )
}

impl Microphone for CpalMicrophone {
    fn record(&self, settings: ListenSettings) -> Result<AudioClip, SttError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SttError::Audio("no default input device available".to_string()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| SttError::Audio(format!("failed to get input config: {}", e)))?;
        let sample_rate = supported.sample_rate().0;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels = config.channels,
            "listening"
        );

        let (tx, rx) = mpsc::channel();
        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, tx),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, tx),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, tx),
            other => {
                return Err(SttError::Audio(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| SttError::Audio(format!("failed to build input stream: {}", e)))?;
        stream
            .play()
            .map_err(|e| SttError::Audio(format!("failed to start input stream: {}", e)))?;

        let mut gate = EnergyGate::new(settings, sample_rate);
        let deadline = Instant::now() + settings.calibration + settings.max_listen;
        while gate.phase() != GatePhase::Done {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(chunk) => {
                    gate.feed(&chunk);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(SttError::Audio("input stream closed".to_string()))
                }
            }
        }
        drop(stream);

        let samples = gate.into_samples();
        if samples.is_empty() {
            return Err(SttError::NoSpeech);
        }
        Ok(AudioClip::new(samples, sample_rate))
    }
}
