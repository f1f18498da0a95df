//! API routes for the question-answering server

pub mod query;

use axum::{
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::query))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> axum::Json<serde_json::Value> {
    let config = state.config();
    let agent = state.agent();

    axum::Json(serde_json::json!({
        "name": "textbook-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over a textbook vector store",
        "endpoints": {
            "POST /api/query": "Answer a question ({\"question\": \"...\"})",
            "GET /api/info": "Service information",
            "GET /health": "Liveness check",
            "GET /ready": "Retriever and generation backend health"
        },
        "retriever": agent.retriever().name(),
        "llm": {
            "provider": agent.llm().name(),
            "model": agent.llm().model(),
        },
        "policy": {
            "top_k": config.retrieval.top_k,
            "similarity_threshold": config.retrieval.similarity_threshold,
            "max_chunks": config.prompt.max_chunks,
            "max_chars_per_chunk": config.prompt.max_chars_per_chunk,
            "max_prompt_chars": config.prompt.max_prompt_chars,
        }
    }))
}
