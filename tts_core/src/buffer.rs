use serde::Serialize;

use crate::error::{Result, TtsError};

/// Sample rate of the PCM returned by the synthesis service.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
/// The synthesis service returns mono audio.
pub const DEFAULT_CHANNELS: usize = 1;

/// Planar floating-point audio: one sample vector per channel, all the same length.
///
/// Fields are private so a buffer can only be built through [`AudioBuffer::new`],
/// which enforces the equal-length invariant. Transformations produce new buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

/// Summary of a buffer, returned to callers alongside the encoded audio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioMetadata {
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub duration_secs: f64,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(TtsError::InvalidBuffer("sample rate must be positive".into()));
        }
        let Some(first) = channels.first() else {
            return Err(TtsError::InvalidBuffer("at least one channel is required".into()));
        };
        let frames = first.len();
        if let Some((idx, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(TtsError::InvalidBuffer(format!(
                "channel {idx} has {} frames, expected {frames}",
                ch.len()
            )));
        }
        Ok(Self { channels, sample_rate })
    }

    /// A buffer of `frames` zero samples on each of `channels` channels.
    pub fn silence(channels: usize, frames: usize, sample_rate: u32) -> Result<Self> {
        Self::new(sample_rate, vec![vec![0.0; frames]; channels])
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn duration_ms(&self) -> u64 {
        (self.duration_secs() * 1000.0) as u64
    }

    pub fn metadata(&self) -> AudioMetadata {
        AudioMetadata {
            sample_rate: self.sample_rate,
            channels: self.channel_count(),
            frames: self.frame_count(),
            duration_secs: self.duration_secs(),
        }
    }
}
