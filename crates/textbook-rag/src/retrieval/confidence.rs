//! Confidence estimation from retrieval similarity scores

use crate::config::ConfidenceThresholds;
use crate::types::{Chunk, Confidence};

/// Maps the mean similarity of the chunks used for an answer onto a label
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator {
    thresholds: ConfidenceThresholds,
}

impl ConfidenceEstimator {
    pub fn new(thresholds: ConfidenceThresholds) -> Self {
        Self { thresholds }
    }

    /// Label for a set of chunks; empty input is always `Low`
    pub fn estimate(&self, chunks: &[Chunk]) -> Confidence {
        match mean_similarity(chunks) {
            Some(mean) => self.label(mean),
            None => Confidence::Low,
        }
    }

    /// Label for an already computed mean similarity
    pub fn label(&self, mean: f32) -> Confidence {
        if mean >= self.thresholds.high {
            Confidence::High
        } else if mean >= self.thresholds.medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Arithmetic mean of similarity scores, `None` when there are no chunks
pub fn mean_similarity(chunks: &[Chunk]) -> Option<f32> {
    if chunks.is_empty() {
        return None;
    }
    let total: f32 = chunks.iter().map(|c| c.similarity_score).sum();
    Some(total / chunks.len() as f32)
}
