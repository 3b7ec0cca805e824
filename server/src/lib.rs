pub mod config;
pub mod error;
pub mod validation;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, Request, State, WebSocketUpgrade,
    },
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorError,
    GovernorLayer,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{info, warn};
use tts_core::{
    synthesis_events, SpeechRequest, SynthesisEvent, SynthesisOutput, SynthesisPipeline, VoiceId,
    VoiceProfile, WAV_MIME_TYPE,
};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::validate_tts_request;

/// Request bodies larger than this are rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SynthesisPipeline>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(pipeline: SynthesisPipeline, config: ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config,
        }
    }

    fn speech_request(
        &self,
        text: &str,
        voice: Option<&str>,
        style: Option<&str>,
    ) -> Result<SpeechRequest, ApiError> {
        let voice = validate_tts_request(text, voice, style)?;
        let style = style
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.config.default_style);
        Ok(SpeechRequest::new(text, voice).with_style(style))
    }
}

#[derive(Deserialize)]
pub struct TtsRequest {
    text: String,
    voice: Option<String>,
    style: Option<String>,
}

#[derive(Serialize)]
pub struct TtsResponse {
    audio_base64: String,
    mime_type: &'static str,
    filename: String,
    duration_ms: u64,
    sample_rate: u32,
    channels: usize,
    segments: usize,
}

impl TtsResponse {
    fn from_output(output: &SynthesisOutput, voice: VoiceId) -> Self {
        Self {
            audio_base64: output.wav.to_base64(),
            mime_type: WAV_MIME_TYPE,
            filename: download_filename(voice, today()),
            duration_ms: duration_ms(output),
            sample_rate: output.metadata.sample_rate,
            channels: output.metadata.channels,
            segments: output.segments,
        }
    }
}

#[derive(Deserialize)]
pub struct StreamParams {
    style: Option<String>,
}

/// File name offered for downloaded recordings: `speech-{Voice}-{YYYY-MM-DD}.wav`.
pub fn download_filename(voice: VoiceId, date: NaiveDate) -> String {
    format!("speech-{}-{}.wav", voice, date.format("%Y-%m-%d"))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn duration_ms(output: &SynthesisOutput) -> u64 {
    (output.metadata.duration_secs * 1000.0) as u64
}

/// CORS: explicit origins when configured, permissive otherwise.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(false);

    let Some(ref allowed_origins) = config.cors_allowed_origins else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        return base.allow_origin(tower_http::cors::Any);
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        base.allow_origin(tower_http::cors::Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(tower_http::cors::AllowOrigin::list(origins))
    }
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()).ok();
    if let Some(id) = request_id.clone() {
        request.headers_mut().insert("x-request-id", id);
    }
    let mut response = next.run(request).await;
    if let Some(id) = request_id {
        response.headers_mut().insert("x-request-id", id);
    }
    response
}

/// All routes, mounted at the root and under `/api`, with tracing, timeout,
/// body limit and CORS layers. Rate limiting is added by [`with_rate_limit`].
pub fn build_router(state: AppState) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(cors_layer(&state.config))
        .into_inner();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route("/voices/detail", get(list_voices_detail))
        .route("/tts", post(tts_endpoint))
        .route("/tts/wav", post(tts_wav_endpoint))
        .route("/stream/{voice}/{text}", get(stream_ws));

    Router::new()
        .merge(api.clone()) // root paths
        .nest("/api", api) // /api prefix
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}

/// Global rate limit shared by every route. Rejections use the same JSON
/// error body as the handlers.
pub fn with_rate_limit(router: Router, config: &ServerConfig) -> anyhow::Result<Router> {
    let per_minute = config.rate_limit_per_minute.max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond((60_000 / u64::from(per_minute)).max(1))
            .burst_size(per_minute)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .context("Invalid rate limit configuration")?,
    );
    info!("Rate limiting: {} requests per minute", per_minute);

    Ok(router.layer(GovernorLayer::new(governor_conf).error_handler(rate_limit_error)))
}

fn rate_limit_error(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = ApiError::RateLimited { wait_secs: wait_time }.into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        other => ApiError::Internal(other.to_string()).into_response(),
    }
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_voices() -> Json<Vec<&'static str>> {
    Json(VoiceId::ALL.iter().map(VoiceId::as_str).collect())
}

pub async fn list_voices_detail() -> Json<Vec<VoiceProfile>> {
    Json(VoiceId::ALL.iter().map(VoiceId::profile).collect())
}

pub async fn tts_endpoint(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let request = state.speech_request(&req.text, req.voice.as_deref(), req.style.as_deref())?;
    let output = state.pipeline.synthesize(&request, None).await?;
    Ok(Json(TtsResponse::from_output(&output, request.voice)))
}

/// Same as `/tts` but answers with the WAV file itself, ready for download.
pub async fn tts_wav_endpoint(
    State(state): State<AppState>,
    Json(req): Json<TtsRequest>,
) -> Result<Response, ApiError> {
    let request = state.speech_request(&req.text, req.voice.as_deref(), req.style.as_deref())?;
    let output = state.pipeline.synthesize(&request, None).await?;

    let filename = download_filename(request.voice, today());
    let headers = [
        (header::CONTENT_TYPE, WAV_MIME_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (
            header::HeaderName::from_static("x-audio-duration-ms"),
            duration_ms(&output).to_string(),
        ),
        (
            header::HeaderName::from_static("x-audio-segments"),
            output.segments.to_string(),
        ),
    ];
    Ok((StatusCode::OK, headers, output.wav.into_inner()).into_response())
}

/// WebSocket: streams pipeline state and progress, then the finished audio.
pub async fn stream_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((voice, text)): Path<(String, String)>,
    Query(params): Query<StreamParams>,
) -> impl IntoResponse {
    let request = state.speech_request(&text, Some(&voice), params.style.as_deref());
    ws.on_upgrade(move |socket| stream_session(socket, state, request))
}

async fn stream_session(
    mut socket: WebSocket,
    state: AppState,
    request: Result<SpeechRequest, ApiError>,
) {
    let request = match request {
        Ok(r) => r,
        Err(e) => {
            let error_msg = serde_json::json!({ "type": "error", "error": e.to_string(), "code": e.status().as_u16() });
            let _ = socket.send(Message::Text(error_msg.to_string().into())).await;
            let _ = socket.close().await;
            return;
        }
    };

    let _ = socket
        .send(Message::Text(
            serde_json::json!({
                "type": "status",
                "status": "synthesizing",
                "message": "Initializing voice synthesizer..."
            })
            .to_string()
            .into(),
        ))
        .await;

    let voice = request.voice;
    let events = synthesis_events(state.pipeline.clone(), request);
    futures_util::pin_mut!(events);

    while let Some(event) = events.next().await {
        let payload = match event {
            SynthesisEvent::State(s) => serde_json::json!({ "type": "state", "detail": s }),
            SynthesisEvent::Progress(p) => serde_json::json!({
                "type": "progress",
                "progress": p,
                "message": format!("Synthesizing audio: {}%", p.round())
            }),
            SynthesisEvent::Completed(output) => serde_json::json!({
                "type": "done",
                "result": TtsResponse::from_output(&output, voice)
            }),
            SynthesisEvent::Failed(message) => {
                serde_json::json!({ "type": "error", "error": message })
            }
        };
        if socket
            .send(Message::Text(payload.to_string().into()))
            .await
            .is_err()
        {
            // Client went away; the run's remaining events are dropped.
            break;
        }
    }

    let _ = socket.close().await;
}
