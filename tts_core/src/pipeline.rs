//! Chunked synthesis orchestration.
//!
//! A run moves through `Idle -> Chunking -> Synthesizing(i of N) -> Merging
//! -> Encoding -> Done`, or ends in `Failed` from any of those. Segments are
//! synthesized strictly one after another so progress stays monotonic and
//! the remote service never sees more than one call per run.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::buffer::{AudioBuffer, AudioMetadata, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
use crate::chunker::{chunk_text, count_words, DEFAULT_MAX_WORDS_PER_CHUNK};
use crate::codec::{decode_base64, decode_pcm};
use crate::concat::merge_buffers;
use crate::error::{Result, TtsError};
use crate::progress::ProgressObserver;
use crate::synthesizer::{SpeechSynthesizer, SynthesisRequest};
use crate::voice::VoiceId;
use crate::wav::{encode_wav_with, WavBytes, WavOptions};

/// Upper bound on words accepted for a single run.
pub const DEFAULT_MAX_TOTAL_WORDS: usize = 10_000;
pub const DEFAULT_STYLE: &str = "natural and professional";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_words_per_chunk: usize,
    pub max_total_words: usize,
    /// Format of the PCM the synthesizer returns.
    pub sample_rate: u32,
    pub channels: usize,
    pub wav: WavOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_words_per_chunk: DEFAULT_MAX_WORDS_PER_CHUNK,
            max_total_words: DEFAULT_MAX_TOTAL_WORDS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            wav: WavOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: VoiceId,
    pub style: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: VoiceId) -> Self {
        Self {
            text: text.into(),
            voice,
            style: DEFAULT_STYLE.to_string(),
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Chunking,
    Synthesizing { index: usize, total: usize },
    Merging,
    Encoding,
    Done,
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub wav: WavBytes,
    pub metadata: AudioMetadata,
    pub segments: usize,
}

/// Drives one [`SpeechRequest`] from text to WAV.
///
/// Holds no per-run state, so one pipeline can serve concurrent runs.
pub struct SynthesisPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
}

impl SynthesisPipeline {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: PipelineConfig) -> Self {
        Self { synthesizer, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline. The first failure aborts the run and discards
    /// any audio synthesized so far.
    pub async fn synthesize(
        &self,
        request: &SpeechRequest,
        observer: Option<&dyn ProgressObserver>,
    ) -> Result<SynthesisOutput> {
        let notify = |state: PipelineState| {
            debug!(?state, "pipeline state");
            if let Some(obs) = observer {
                obs.on_state(&state);
            }
        };

        notify(PipelineState::Idle);
        let result = self.run(request, observer, &notify).await;
        match &result {
            Ok(output) => {
                notify(PipelineState::Done);
                info!(
                    segments = output.segments,
                    duration_secs = output.metadata.duration_secs,
                    bytes = output.wav.len(),
                    "speech synthesized"
                );
            }
            Err(e) => notify(PipelineState::Failed { message: e.to_string() }),
        }
        result
    }

    async fn run(
        &self,
        request: &SpeechRequest,
        observer: Option<&dyn ProgressObserver>,
        notify: &impl Fn(PipelineState),
    ) -> Result<SynthesisOutput> {
        let words = count_words(&request.text);
        if words == 0 {
            return Err(TtsError::EmptyText);
        }
        if words > self.config.max_total_words {
            return Err(TtsError::TextTooLong {
                words,
                max: self.config.max_total_words,
            });
        }

        notify(PipelineState::Chunking);
        let segments = chunk_text(&request.text, self.config.max_words_per_chunk);
        let total = segments.len();
        info!(words, segments = total, voice = %request.voice, "starting synthesis");

        let mut buffers: Vec<AudioBuffer> = Vec::with_capacity(total);
        for (index, segment) in segments.into_iter().enumerate() {
            notify(PipelineState::Synthesizing { index, total });
            if let Some(obs) = observer {
                obs.on_progress(index as f32 / total as f32 * 100.0);
            }

            let call = SynthesisRequest {
                segment_text: segment.text,
                voice: request.voice,
                style: request.style.clone(),
            };
            let buffer = match self.synthesize_segment(index, &call).await {
                Ok(buffer) => buffer,
                Err(e) => {
                    error!(segment = index, "error generating segment: {e}");
                    return Err(e);
                }
            };
            debug!(segment = index, frames = buffer.frame_count(), "segment decoded");
            buffers.push(buffer);
        }

        notify(PipelineState::Merging);
        let merged = merge_buffers(buffers)?;

        notify(PipelineState::Encoding);
        let wav = encode_wav_with(&merged, self.config.wav)?;
        if let Some(obs) = observer {
            obs.on_progress(100.0);
        }

        Ok(SynthesisOutput {
            wav,
            metadata: merged.metadata(),
            segments: total,
        })
    }

    async fn synthesize_segment(&self, index: usize, call: &SynthesisRequest) -> Result<AudioBuffer> {
        let payload = self
            .synthesizer
            .synthesize(call)
            .await
            .map_err(|e| TtsError::SynthesisCallFailed {
                segment: index,
                message: format!("{e:#}"),
            })?;

        let bytes = decode_base64(&payload)?;
        if bytes.is_empty() {
            return Err(TtsError::SynthesisCallFailed {
                segment: index,
                message: "No audio data returned from synthesis service".to_string(),
            });
        }
        decode_pcm(&bytes, self.config.sample_rate, self.config.channels)
    }
}
