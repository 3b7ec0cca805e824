use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use gemini_core::GeminiTtsClient;
use tokio::net::TcpListener;
use tracing::info;
use tts_core::SynthesisPipeline;

use server::{build_router, config::ServerConfig, with_rate_limit, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    async_main().await
}

async fn async_main() -> anyhow::Result<()> {
    info!("Starting speech synthesis server...");

    // Load configuration from environment
    let config = ServerConfig::from_env();
    let synthesizer = GeminiTtsClient::from_env().context("Failed to create Gemini TTS client")?;
    let pipeline = SynthesisPipeline::new(Arc::new(synthesizer), config.pipeline_config());

    info!(
        "Server configuration loaded: port={}, rate_limit={}/min, max_words={}, words_per_chunk={}",
        config.port, config.rate_limit_per_minute, config.max_total_words, config.max_words_per_chunk
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    // Global limit: all requests share it, which also caps upstream load
    let app = with_rate_limit(build_router(AppState::new(pipeline, config.clone())), &config)?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
