//! Codec primitives: base64 transport encoding and 16-bit PCM sample conversion.

use base64::{engine::general_purpose, Engine as _};

use crate::buffer::AudioBuffer;
use crate::error::{Result, TtsError};

// Asymmetric scale: negative samples reach -32768, positive ones stop at 32767.
const NEGATIVE_SCALE: f32 = 32768.0;
const POSITIVE_SCALE: f32 = 32767.0;

/// Decode a standard (padded) base64 payload into raw bytes.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| TtsError::MalformedAudioData(format!("invalid base64 payload: {e}")))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Normalize a signed 16-bit sample to roughly [-1.0, 0.99997].
#[inline]
pub fn pcm_sample_to_f32(v: i16) -> f32 {
    v as f32 / NEGATIVE_SCALE
}

/// Clamp and quantize a float sample to signed 16-bit.
#[inline]
pub fn f32_to_pcm_sample(s: f32) -> i16 {
    let clamped = s.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * NEGATIVE_SCALE
    } else {
        clamped * POSITIVE_SCALE
    };
    scaled.round() as i16
}

/// Build an [`AudioBuffer`] from interleaved little-endian s16 PCM.
///
/// Sample `i` of channel `c` is read from PCM index `i * channels + c`.
pub fn decode_pcm(bytes: &[u8], sample_rate: u32, channels: usize) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(TtsError::MalformedAudioData("channel count must be positive".into()));
    }
    let frame_bytes = 2 * channels;
    if bytes.len() % frame_bytes != 0 {
        return Err(TtsError::MalformedAudioData(format!(
            "{} bytes is not a whole number of {channels}-channel s16 frames",
            bytes.len()
        )));
    }

    let frames = bytes.len() / frame_bytes;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in bytes.chunks_exact(frame_bytes) {
        for (c, sample) in frame.chunks_exact(2).enumerate() {
            let v = i16::from_le_bytes([sample[0], sample[1]]);
            planar[c].push(pcm_sample_to_f32(v));
        }
    }

    AudioBuffer::new(sample_rate, planar)
}
