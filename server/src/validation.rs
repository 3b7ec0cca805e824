use tts_core::VoiceId;

use crate::error::ApiError;

/// Maximum length of a style instruction
const MAX_STYLE_LENGTH: usize = 500;

/// Validate a TTS request and resolve its voice.
///
/// The word ceiling is enforced by the pipeline itself, which reports it as
/// `TextTooLong` before any remote call.
pub fn validate_tts_request(
    text: &str,
    voice: Option<&str>,
    style: Option<&str>,
) -> Result<VoiceId, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }

    if let Some(style) = style {
        if style.chars().count() > MAX_STYLE_LENGTH {
            return Err(ApiError::InvalidInput(format!(
                "Style instruction too long (max {} characters)",
                MAX_STYLE_LENGTH
            )));
        }
    }

    match voice {
        Some(v) => v.parse::<VoiceId>().map_err(ApiError::InvalidInput),
        None => Ok(VoiceId::default()),
    }
}
