//! Finance chat server binary
//!
//! Run with: cargo run -p fin-rag --bin fin-rag-server [config.toml]

use fin_rag::{config::FinRagConfig, server::FinRagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fin_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = FinRagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Generation backend: {:?}", config.llm.backend);
    tracing::info!("  - Generation model: {}", config.llm.generate_model);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - KB snapshot: {}", config.corpus.snapshot_path.display());

    if config.llm.api_key.is_none() && config.llm.backend == fin_rag::config::LlmBackend::OpenAi {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail until it is configured");
        tracing::warn!("Set USE_MOCK_CHAT=true to serve canned answers instead");
    }
    if !config.corpus.snapshot_path.exists() {
        tracing::warn!(
            "KB snapshot {} not found; definition questions will fail until it is generated",
            config.corpus.snapshot_path.display()
        );
    }

    let server = FinRagServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
