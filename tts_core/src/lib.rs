//! Long-form speech synthesis pipeline.
//!
//! Text is split into word-bounded segments, each segment is synthesized by a
//! remote [`SpeechSynthesizer`], the returned base64 PCM is decoded into
//! [`AudioBuffer`]s, the buffers are concatenated, and the result is encoded
//! as a 16-bit PCM WAV file.

mod buffer;
mod chunker;
mod codec;
mod concat;
mod error;
mod pipeline;
mod progress;
mod stream;
mod synthesizer;
mod voice;
mod wav;

pub use buffer::{AudioBuffer, AudioMetadata, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
pub use chunker::{chunk_text, count_words, TextSegment, DEFAULT_MAX_WORDS_PER_CHUNK};
pub use codec::{decode_base64, decode_pcm, encode_base64, f32_to_pcm_sample, pcm_sample_to_f32};
pub use concat::merge_buffers;
pub use error::{Result, TtsError};
pub use pipeline::{
    PipelineConfig, PipelineState, SpeechRequest, SynthesisOutput, SynthesisPipeline,
    DEFAULT_MAX_TOTAL_WORDS, DEFAULT_STYLE,
};
pub use progress::{ProgressObserver, SynthesisEvent};
pub use stream::synthesis_events;
pub use synthesizer::{SpeechSynthesizer, SynthesisRequest};
pub use voice::{VoiceId, VoiceProfile};
pub use wav::{
    encode_wav, encode_wav_with, ChannelPolicy, RiffSize, WavBytes, WavOptions, WAV_HEADER_LEN,
    WAV_MIME_TYPE,
};
