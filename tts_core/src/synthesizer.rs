use async_trait::async_trait;

use crate::voice::VoiceId;

/// One call's worth of work for the remote synthesis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub segment_text: String,
    pub voice: VoiceId,
    pub style: String,
}

impl SynthesisRequest {
    /// Prompt sent to the service: style instruction followed by the segment.
    pub fn prompt(&self) -> String {
        format!(
            "Style instruction: {}. Please say the following clearly: {}",
            self.style, self.segment_text
        )
    }
}

/// Remote speech synthesis.
///
/// Implementations return base64 of raw little-endian s16 PCM, mono at 24 kHz.
/// Timeouts and transport retries are the implementation's concern.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> anyhow::Result<String>;
}
