// Configuration for the server and the synthesis pipeline it drives

use std::time::Duration;

use tts_core::{ChannelPolicy, PipelineConfig, RiffSize, WavOptions};

pub const DEFAULT_STYLE_INSTRUCTION: &str =
    "Speak clearly with a natural pace and professional tone.";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub max_words_per_chunk: usize,
    pub max_total_words: usize,
    pub default_style: String,
    pub wav_standard_riff_size: bool,
    pub wav_interleave_channels: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8085,
            rate_limit_per_minute: 60,
            // Long-form runs make many sequential remote calls.
            request_timeout_secs: 600,
            cors_allowed_origins: None,
            max_words_per_chunk: tts_core::DEFAULT_MAX_WORDS_PER_CHUNK,
            max_total_words: tts_core::DEFAULT_MAX_TOTAL_WORDS,
            default_style: DEFAULT_STYLE_INSTRUCTION.to_string(),
            wav_standard_riff_size: false,
            wav_interleave_channels: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect()
            });

        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            rate_limit_per_minute: env_parse("RATE_LIMIT_PER_MINUTE")
                .unwrap_or(defaults.rate_limit_per_minute),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            cors_allowed_origins,
            max_words_per_chunk: env_parse("MAX_WORDS_PER_CHUNK")
                .unwrap_or(defaults.max_words_per_chunk),
            max_total_words: env_parse("MAX_TOTAL_WORDS").unwrap_or(defaults.max_total_words),
            default_style: std::env::var("DEFAULT_STYLE").unwrap_or(defaults.default_style),
            wav_standard_riff_size: env_parse("WAV_STANDARD_RIFF_SIZE")
                .unwrap_or(defaults.wav_standard_riff_size),
            wav_interleave_channels: env_parse("WAV_INTERLEAVE_CHANNELS")
                .unwrap_or(defaults.wav_interleave_channels),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings handed to the synthesis pipeline.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_words_per_chunk: self.max_words_per_chunk,
            max_total_words: self.max_total_words,
            wav: WavOptions {
                riff_size: if self.wav_standard_riff_size {
                    RiffSize::Standard
                } else {
                    RiffSize::Legacy
                },
                channels: if self.wav_interleave_channels {
                    ChannelPolicy::Interleave
                } else {
                    ChannelPolicy::FirstChannel
                },
            },
            ..PipelineConfig::default()
        }
    }
}
