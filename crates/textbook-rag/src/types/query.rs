//! Query request types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest question accepted over HTTP, in characters
pub const MAX_QUESTION_CHARS: usize = 2_000;

/// Query request for the question-answering endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }

    /// Reject empty or oversized questions before they reach the pipeline
    pub fn validate(&self) -> Result<&str> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(Error::InvalidRequest("question must not be empty".to_string()));
        }
        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(Error::InvalidRequest(format!(
                "question exceeds {} characters",
                MAX_QUESTION_CHARS
            )));
        }
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims() {
        let request = QueryRequest::new("  What is ROS 2?  ");
        assert_eq!(request.validate().unwrap(), "What is ROS 2?");
    }

    #[test]
    fn test_validate_rejects_blank() {
        assert!(QueryRequest::new("   ").validate().is_err());
        assert!(QueryRequest::new("a".repeat(MAX_QUESTION_CHARS + 1)).validate().is_err());
    }
}
