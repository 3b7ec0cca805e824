use crate::buffer::{AudioBuffer, DEFAULT_SAMPLE_RATE};
use crate::error::{Result, TtsError};

/// Hard-concatenate buffers in order: no gaps, crossfade, or resampling.
///
/// An empty list yields a single frame of mono silence at the default rate
/// (the "no audio produced" placeholder). A single buffer is returned as-is.
pub fn merge_buffers(mut buffers: Vec<AudioBuffer>) -> Result<AudioBuffer> {
    match buffers.len() {
        0 => return AudioBuffer::silence(1, 1, DEFAULT_SAMPLE_RATE),
        1 => return Ok(buffers.swap_remove(0)),
        _ => {}
    }

    let channels = buffers[0].channel_count();
    let sample_rate = buffers[0].sample_rate();
    for (idx, buf) in buffers.iter().enumerate().skip(1) {
        if buf.channel_count() != channels {
            return Err(TtsError::IncompatibleBuffers(format!(
                "buffer {idx} has {} channels, expected {channels}",
                buf.channel_count()
            )));
        }
        if buf.sample_rate() != sample_rate {
            return Err(TtsError::IncompatibleBuffers(format!(
                "buffer {idx} is {} Hz, expected {sample_rate} Hz",
                buf.sample_rate()
            )));
        }
    }

    let total: usize = buffers.iter().map(AudioBuffer::frame_count).sum();
    let mut merged = vec![Vec::with_capacity(total); channels];
    for buf in buffers {
        for (out, data) in merged.iter_mut().zip(buf.into_channels()) {
            out.extend(data);
        }
    }

    AudioBuffer::new(sample_rate, merged)
}
