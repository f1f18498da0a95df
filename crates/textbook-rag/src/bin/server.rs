//! Question-answering server binary
//!
//! Run with: cargo run -p textbook-rag --bin textbook-rag-server [config.toml]

use std::path::PathBuf;

use textbook_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textbook_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("TEXTBOOK_RAG_CONFIG").map(PathBuf::from));
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Qdrant: {} (collection {})", config.qdrant.url, config.qdrant.collection);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Generation backend: {:?}", config.generation.backend);
    tracing::info!(
        "  - Retrieval: top_k={}, threshold={}",
        config.retrieval.top_k,
        config.retrieval.similarity_threshold
    );
    tracing::info!(
        "  - Prompt budget: {} chunks x {} chars, ceiling {} chars",
        config.prompt.max_chunks,
        config.prompt.max_chars_per_chunk,
        config.prompt.max_prompt_chars
    );

    // Create and start server
    let server = RagServer::new(config)?;

    let health = server_health(&server).await;
    if !health {
        tracing::warn!("One or more collaborators are unavailable; /ready will report 503");
    }

    tracing::info!("Endpoints:");
    tracing::info!("  POST /api/query - Ask a question");
    tracing::info!("  GET  /health    - Liveness");
    tracing::info!("  GET  /ready     - Collaborator health");

    server.start().await?;

    Ok(())
}

async fn server_health(server: &RagServer) -> bool {
    let health = server.state().health().await;
    for provider in [&health.retriever, &health.llm] {
        if provider.healthy {
            tracing::info!("{} is reachable", provider.name);
        } else {
            tracing::warn!(
                "{} is not reachable{}",
                provider.name,
                provider
                    .error
                    .as_deref()
                    .map(|e| format!(": {}", e))
                    .unwrap_or_default()
            );
        }
    }
    health.all_healthy()
}
