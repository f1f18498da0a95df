//! Post-retrieval processing: chunk sanitization and confidence scoring

pub mod confidence;
pub mod sanitizer;

pub use confidence::{mean_similarity, ConfidenceEstimator};
pub use sanitizer::{ChunkSanitizer, DropReason, DroppedChunk, SanitizeReport};
