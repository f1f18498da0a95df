//! textbook-rag: question answering over a textbook vector store
//!
//! A query is answered by retrieving passages from Qdrant, filtering them down
//! to substantive text, packing the best few into a size-budgeted prompt with
//! the question first, and handing that prompt to a generation backend
//! (Ollama or the Hugging Face Inference API). Every query yields a
//! [`QueryResponse`] with sources and a coarse confidence label, including
//! when an external call fails.

pub mod agent;
pub mod config;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use agent::{PipelineObserver, QueryFailure, QueryStage, RagAgent};
pub use config::{PromptBudget, RagConfig};
pub use error::{Error, Result};
pub use types::{
    Chunk, Confidence, QueryRequest, QueryResponse, QueryStatus, RawChunk, RawContent,
    RetrievalResult,
};
