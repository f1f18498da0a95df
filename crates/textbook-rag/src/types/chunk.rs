//! Retrieved passage types: raw records from the vector store and sanitized chunks

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content field of a raw retrieval record
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// The record had no content field (or it was null)
    Missing,
    /// The content field was present but not a string; holds the JSON type name
    NonText(String),
    /// String content, untouched
    Text(String),
}

impl RawContent {
    /// Classify a JSON value found under the content key
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Bool(_)) => Self::NonText("bool".to_string()),
            Some(Value::Number(_)) => Self::NonText("number".to_string()),
            Some(Value::Array(_)) => Self::NonText("array".to_string()),
            Some(Value::Object(_)) => Self::NonText("object".to_string()),
        }
    }

    /// Text content, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A retrieval record exactly as the retriever returned it.
///
/// Any field may be absent or wrong-typed; the sanitizer decides what survives.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    pub content: RawContent,
    pub url: Option<String>,
    pub position: Option<i64>,
    pub similarity_score: Option<f32>,
}

impl RawChunk {
    /// Build a well-formed raw record (mostly useful for adapters and tests)
    pub fn new(
        content: impl Into<String>,
        url: impl Into<String>,
        position: i64,
        similarity_score: f32,
    ) -> Self {
        Self {
            content: RawContent::Text(content.into()),
            url: Some(url.into()),
            position: Some(position),
            similarity_score: Some(similarity_score),
        }
    }

    /// Leniently convert a JSON payload into a raw record.
    ///
    /// `content` falls back to `text`, `position` falls back to `chunk_index`.
    /// Wrong-typed url/position/score become `None` instead of failing.
    pub fn from_payload(payload: &Value, score: Option<f32>) -> Self {
        let field = |primary: &str, fallback: &str| {
            payload
                .get(primary)
                .filter(|v| !v.is_null())
                .or_else(|| payload.get(fallback))
        };

        let similarity_score = score.or_else(|| {
            payload
                .get("similarity_score")
                .and_then(Value::as_f64)
                .map(|s| s as f32)
        });

        Self {
            content: RawContent::from_value(field("content", "text")),
            url: payload.get("url").and_then(Value::as_str).map(str::to_string),
            position: field("position", "chunk_index").and_then(Value::as_i64),
            similarity_score,
        }
    }
}

impl From<Chunk> for RawChunk {
    fn from(chunk: Chunk) -> Self {
        Self {
            content: RawContent::Text(chunk.content),
            url: Some(chunk.url),
            position: Some(chunk.position),
            similarity_score: Some(chunk.similarity_score),
        }
    }
}

/// A sanitized passage: substantive, well-formed text with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Passage text (never empty or whitespace-only)
    pub content: String,
    /// Source identifier, empty when the record carried none
    pub url: String,
    /// Ordinal position within the source document
    pub position: i64,
    /// Relevance score, higher is more relevant
    pub similarity_score: f32,
}

impl Chunk {
    /// Promote a raw record whose content already passed validation.
    pub(crate) fn from_validated(raw: RawChunk, content: String) -> Self {
        let similarity_score = raw
            .similarity_score
            .filter(|s| s.is_finite())
            .unwrap_or(0.0);

        Self {
            content,
            url: raw.url.unwrap_or_default(),
            position: raw.position.unwrap_or(0),
            similarity_score,
        }
    }
}

/// Ordered retrieval output for one query
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    /// The query that produced these records
    pub query: String,
    /// Records in retrieval-rank order, most relevant first
    pub chunks: Vec<RawChunk>,
    /// Number of records returned
    pub total_results: usize,
}

impl RetrievalResult {
    pub fn new(query: impl Into<String>, chunks: Vec<RawChunk>) -> Self {
        Self {
            query: query.into(),
            total_results: chunks.len(),
            chunks,
        }
    }

    /// Empty result for a query that matched nothing
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_with_all_fields() {
        let payload = json!({
            "content": "ROS 2 is a middleware framework.",
            "url": "https://book.example/ros2/intro",
            "position": 4
        });
        let raw = RawChunk::from_payload(&payload, Some(0.82));

        assert_eq!(raw.content.as_text(), Some("ROS 2 is a middleware framework."));
        assert_eq!(raw.url.as_deref(), Some("https://book.example/ros2/intro"));
        assert_eq!(raw.position, Some(4));
        assert_eq!(raw.similarity_score, Some(0.82));
    }

    #[test]
    fn test_payload_fallback_keys() {
        let payload = json!({ "text": "fallback body", "chunk_index": 7 });
        let raw = RawChunk::from_payload(&payload, None);

        assert_eq!(raw.content.as_text(), Some("fallback body"));
        assert_eq!(raw.position, Some(7));
        assert_eq!(raw.url, None);
        assert_eq!(raw.similarity_score, None);
    }

    #[test]
    fn test_payload_wrong_types_do_not_panic() {
        let payload = json!({ "content": 42, "url": ["a"], "position": "three" });
        let raw = RawChunk::from_payload(&payload, Some(0.5));

        assert_eq!(raw.content, RawContent::NonText("number".to_string()));
        assert_eq!(raw.url, None);
        assert_eq!(raw.position, None);
    }

    #[test]
    fn test_from_validated_defaults() {
        let raw = RawChunk {
            content: RawContent::Text("body".into()),
            url: None,
            position: None,
            similarity_score: Some(f32::NAN),
        };
        let chunk = Chunk::from_validated(raw, "body".into());

        assert_eq!(chunk.url, "");
        assert_eq!(chunk.position, 0);
        assert_eq!(chunk.similarity_score, 0.0);
    }

    #[test]
    fn test_retrieval_result_counts() {
        let result = RetrievalResult::new("q", vec![RawChunk::new("a", "u", 0, 0.1)]);
        assert_eq!(result.total_results, 1);
        assert!(RetrievalResult::empty("q").is_empty());
    }
}
