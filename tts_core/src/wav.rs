use crate::buffer::AudioBuffer;
use crate::codec::{encode_base64, f32_to_pcm_sample};
use crate::error::{Result, TtsError};

pub const WAV_MIME_TYPE: &str = "audio/wav";
pub const WAV_HEADER_LEN: usize = 44;

/// Value written to the RIFF ChunkSize field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RiffSize {
    /// `32 + dataBytes`, four bytes short of the RIFF definition. Matches
    /// files produced by earlier releases byte-for-byte.
    #[default]
    Legacy,
    /// `36 + dataBytes`.
    Standard,
}

/// Which channels end up in the data chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelPolicy {
    /// Only channel 0 is written. The header still declares the buffer's
    /// channel count.
    #[default]
    FirstChannel,
    /// All channels, frame-interleaved.
    Interleave,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavOptions {
    pub riff_size: RiffSize,
    pub channels: ChannelPolicy,
}

/// A complete RIFF/WAVE file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBytes(Vec<u8>);

impl WavBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The PCM payload following the header.
    pub fn data(&self) -> &[u8] {
        &self.0[WAV_HEADER_LEN.min(self.0.len())..]
    }

    pub fn to_base64(&self) -> String {
        encode_base64(&self.0)
    }
}

impl AsRef<[u8]> for WavBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode with the legacy layout (channel 0 only, short RIFF size).
pub fn encode_wav(buffer: &AudioBuffer) -> Result<WavBytes> {
    encode_wav_with(buffer, WavOptions::default())
}

/// Encode `buffer` as canonical 16-bit PCM WAV.
pub fn encode_wav_with(buffer: &AudioBuffer, options: WavOptions) -> Result<WavBytes> {
    let frames = buffer.frame_count();
    if frames == 0 {
        return Err(TtsError::EmptyBuffer);
    }

    // WAV header fields
    let sample_rate = buffer.sample_rate();
    let bits_per_sample: u16 = 16;
    let num_channels = u16::try_from(buffer.channel_count())
        .map_err(|_| header_overflow("channel count", buffer))?;
    let block_align = num_channels
        .checked_mul(bits_per_sample / 8)
        .ok_or_else(|| header_overflow("block align", buffer))?;
    let byte_rate = sample_rate
        .checked_mul(u32::from(block_align))
        .ok_or_else(|| header_overflow("byte rate", buffer))?;
    let written_channels = match options.channels {
        ChannelPolicy::FirstChannel => 1,
        ChannelPolicy::Interleave => buffer.channel_count(),
    };
    let data_size = frames
        .checked_mul(written_channels)
        .and_then(|n| n.checked_mul(2))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| header_overflow("data size", buffer))?;
    let riff_size = match options.riff_size {
        RiffSize::Legacy => data_size.checked_add(32),
        RiffSize::Standard => data_size.checked_add(36),
    }
    .ok_or_else(|| header_overflow("RIFF size", buffer))?;

    let mut out = Vec::<u8>::with_capacity(WAV_HEADER_LEN + data_size as usize);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    let channels = &buffer.channels()[..written_channels];
    for i in 0..frames {
        for ch in channels {
            out.extend_from_slice(&f32_to_pcm_sample(ch[i]).to_le_bytes());
        }
    }

    Ok(WavBytes(out))
}

fn header_overflow(field: &str, buffer: &AudioBuffer) -> TtsError {
    TtsError::InvalidBuffer(format!(
        "{field} does not fit a WAV header ({} channels, {} frames at {} Hz)",
        buffer.channel_count(),
        buffer.frame_count(),
        buffer.sample_rate()
    ))
}
