//! Core types for the question-answering pipeline

pub mod chunk;
pub mod query;
pub mod response;

pub use chunk::{Chunk, RawChunk, RawContent, RetrievalResult};
pub use query::QueryRequest;
pub use response::{Confidence, QueryResponse, QueryStatus};
