use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tts_core::{SpeechSynthesizer, SynthesisRequest, VoiceId};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }

    /// Read `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_TTS_MODEL`,
    /// `GEMINI_BASE_URL` and `GEMINI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .context("GEMINI_API_KEY must be set in the environment")?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_TTS_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.timeout_secs);
        Ok(config)
    }
}

/// Structure for the generateContent request
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

/// Structure for the generateContent response (only the fields we read)
#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn build_request<'a>(prompt: &'a str, voice: VoiceId) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![TextPart { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_modalities: ["AUDIO"],
            speech_config: SpeechConfig {
                voice_config: VoiceConfig {
                    prebuilt_voice_config: PrebuiltVoiceConfig {
                        voice_name: voice.as_str(),
                    },
                },
            },
        },
    }
}

/// Pull the base64 audio out of the first candidate.
fn extract_audio(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .find_map(|part| part.inline_data.map(|d| d.data))
        })
        .filter(|data| !data.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No audio data returned from Gemini API"))
}

/// Turn a non-2xx body into a readable error, preferring the API's own message.
fn api_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => anyhow::anyhow!(env.error.message),
        Err(_) => anyhow::anyhow!("Gemini API returned {status}"),
    }
}

pub struct GeminiTtsClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiTtsClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Send one prompt and return the base64 PCM payload.
    pub async fn generate_speech(&self, prompt: &str, voice: VoiceId) -> Result<String> {
        let body = build_request(prompt, voice);
        debug!(model = %self.config.model, %voice, chars = prompt.len(), "gemini generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .context("request to Gemini API failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .context("Gemini API returned an unreadable response")?;
        extract_audio(parsed)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiTtsClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String> {
        self.generate_speech(&request.prompt(), request.voice).await
    }
}
