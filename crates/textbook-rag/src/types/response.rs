//! Response types for answered queries

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::chunk::Chunk;

/// Coarse label summarizing retrieval relevance for an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// Outcome of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
}

/// Response from a question-answering query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Generated answer, or a human-readable error message
    pub answer: String,
    /// Unique source URLs of the chunks that went into the prompt
    pub sources: Vec<String>,
    /// All chunks that survived sanitization
    pub matched_chunks: Vec<Chunk>,
    /// Confidence derived from the similarity of the chunks used
    pub confidence: Confidence,
    /// Wall-clock time spent on the query
    pub query_time_ms: f64,
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Create a successful response
    pub fn success(
        answer: impl Into<String>,
        sources: Vec<String>,
        matched_chunks: Vec<Chunk>,
        confidence: Confidence,
        query_time_ms: f64,
    ) -> Self {
        Self {
            answer: answer.into(),
            sources,
            matched_chunks,
            confidence,
            query_time_ms,
            status: QueryStatus::Success,
            error: None,
        }
    }

    /// Create an error response; sources and chunks are always empty
    pub fn failure(error: impl Into<String>, query_time_ms: f64) -> Self {
        let error = error.into();
        Self {
            answer: format!("Error: {}", error),
            sources: Vec::new(),
            matched_chunks: Vec::new(),
            confidence: Confidence::Low,
            query_time_ms,
            status: QueryStatus::Error,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

/// Unique, non-empty URLs in first-seen order
pub fn unique_sources<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for chunk in chunks {
        if !chunk.url.is_empty() && seen.insert(chunk.url.as_str()) {
            sources.push(chunk.url.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(url: &str) -> Chunk {
        Chunk {
            content: "x".repeat(120),
            url: url.to_string(),
            position: 0,
            similarity_score: 0.5,
        }
    }

    #[test]
    fn test_unique_sources_dedup_in_order() {
        let chunks = vec![chunk("b"), chunk("a"), chunk("b"), chunk("")];
        assert_eq!(unique_sources(&chunks), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_failure_shape() {
        let response = QueryResponse::failure("Retrieval error: timeout", 12.5);
        assert_eq!(response.status, QueryStatus::Error);
        assert!(response.sources.is_empty());
        assert!(response.matched_chunks.is_empty());
        assert_eq!(response.answer, "Error: Retrieval error: timeout");
        assert_eq!(response.query_time_ms, 12.5);
    }

    #[test]
    fn test_serialized_field_contract() {
        let response = QueryResponse::success("ok", vec![], vec![], Confidence::Medium, 1.0);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["confidence"], "medium");
        assert!(value.get("error").is_none());

        let failed = serde_json::to_value(QueryResponse::failure("boom", 1.0)).unwrap();
        assert_eq!(failed["status"], "error");
        assert_eq!(failed["error"], "boom");
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert_eq!(Confidence::High.to_string(), "high");
    }
}
