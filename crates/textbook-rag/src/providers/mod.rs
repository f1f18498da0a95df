//! Provider abstractions for retrieval, embeddings and generation
//!
//! The pipeline depends only on the traits; concrete adapters talk to Qdrant,
//! Ollama and the Hugging Face Inference API.

pub mod embedding;
pub mod huggingface;
pub mod llm;
pub mod ollama;
pub mod qdrant;
pub mod retriever;

pub use embedding::EmbeddingProvider;
pub use huggingface::HuggingFaceClient;
pub use llm::LlmProvider;
pub use ollama::OllamaClient;
pub use qdrant::{CollectionInfo, QdrantRetriever};
pub use retriever::Retriever;

use std::sync::Arc;

use crate::config::{GenerationBackend, RagConfig};
use crate::error::Result;

/// Concrete collaborators built from configuration
pub struct Providers {
    pub retriever: Arc<QdrantRetriever>,
    pub llm: Arc<dyn LlmProvider>,
}

impl Providers {
    /// Build the Qdrant retriever and the configured generation backend
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let ollama = Arc::new(OllamaClient::new(&config.llm, &config.embeddings)?);

        let retriever = Arc::new(QdrantRetriever::new(
            config.qdrant.clone(),
            Arc::clone(&ollama) as Arc<dyn EmbeddingProvider>,
        )?);

        let llm: Arc<dyn LlmProvider> = match config.generation.backend {
            GenerationBackend::Ollama => ollama,
            GenerationBackend::HuggingFace => {
                Arc::new(HuggingFaceClient::new(&config.huggingface)?)
            }
        };

        tracing::info!(
            "Providers ready: retriever=qdrant({}), llm={}({})",
            config.qdrant.collection,
            llm.name(),
            llm.model()
        );

        Ok(Self { retriever, llm })
    }
}
