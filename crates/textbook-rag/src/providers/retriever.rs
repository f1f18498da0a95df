//! Retriever trait for nearest-neighbor passage search

use async_trait::async_trait;
use crate::error::Result;
use crate::types::RetrievalResult;

/// Trait for passage retrieval
///
/// Implementations:
/// - `QdrantRetriever`: Qdrant collection searched with an Ollama query embedding
///
/// Results must come back in relevance order, most relevant first; the
/// sanitizer and prompt budgeter rely on that ordering.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `top_k` passages scoring at least `threshold`
    async fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> Result<RetrievalResult>;

    /// Check if the backing store is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
