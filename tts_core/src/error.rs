use thiserror::Error;

/// All errors produced by the synthesis pipeline.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("text is empty")]
    EmptyText,

    #[error("Text is too long ({words} words, max {max} words).")]
    TextTooLong { words: usize, max: usize },

    /// Display is the collaborator's message, unmodified, so callers can show it as-is.
    #[error("{message}")]
    SynthesisCallFailed { segment: usize, message: String },

    #[error("malformed audio data: {0}")]
    MalformedAudioData(String),

    #[error("incompatible buffers: {0}")]
    IncompatibleBuffers(String),

    #[error("cannot encode an empty audio buffer")]
    EmptyBuffer,

    #[error("invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

pub type Result<T> = std::result::Result<T, TtsError>;
