//! Common utilities for integration tests

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use server::{build_router, config::ServerConfig, AppState};
use tts_core::{encode_base64, SpeechSynthesizer, SynthesisPipeline, SynthesisRequest};

/// PCM for two samples: 0 and 16384.
pub const TEST_PCM: [u8; 4] = [0x00, 0x00, 0x00, 0x40];

/// Stand-in for the remote service: returns `TEST_PCM`, or fails when asked to.
pub struct FakeSynthesizer {
    pub calls: AtomicUsize,
    pub fail_with: Option<String>,
}

impl FakeSynthesizer {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _request: &SynthesisRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(msg) => Err(anyhow::anyhow!(msg.clone())),
            None => Ok(encode_base64(&TEST_PCM)),
        }
    }
}

/// Create a test app instance backed by `synth`
pub fn create_test_app_with(synth: Arc<FakeSynthesizer>, config: ServerConfig) -> Router {
    let pipeline = SynthesisPipeline::new(synth, config.pipeline_config());
    build_router(AppState::new(pipeline, config))
}

/// Create a test app instance with a succeeding synthesizer
pub fn create_test_app() -> (Router, Arc<FakeSynthesizer>) {
    let synth = Arc::new(FakeSynthesizer::ok());
    (create_test_app_with(synth.clone(), ServerConfig::default()), synth)
}

/// Serve `app` on an ephemeral local port for tests that need a real socket
pub async fn spawn_server(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
