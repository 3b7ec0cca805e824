use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tts_core::TtsError;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Synthesis(#[from] TtsError),

    #[error("Rate limit exceeded, retry in {wait_secs}s")]
    RateLimited { wait_secs: u64 },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Synthesis(e) => match e {
                TtsError::EmptyText | TtsError::TextTooLong { .. } => StatusCode::BAD_REQUEST,
                TtsError::SynthesisCallFailed { .. } | TtsError::MalformedAudioData(_) => {
                    StatusCode::BAD_GATEWAY
                }
                TtsError::IncompatibleBuffers(_)
                | TtsError::EmptyBuffer
                | TtsError::InvalidBuffer(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Synthesis(e) => {
                if status.is_server_error() {
                    tracing::error!("Synthesis error: {}", e);
                }
                e.to_string()
            }
            ApiError::RateLimited { .. } => self.to_string(),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                self.to_string()
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
