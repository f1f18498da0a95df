//! Chunk sanitization: drop malformed, empty and navigation-only passages
//!
//! Retrieval order is assumed to be relevance order, so the filter never
//! reorders; it only removes. Content of surviving chunks is never modified.

use std::fmt;

use crate::config::SanitizerConfig;
use crate::types::{Chunk, RawChunk, RawContent};

/// Why a chunk was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// No content field at all
    MissingContent,
    /// Content present but not a string
    NonTextContent(String),
    /// Content is empty or whitespace only
    Blank,
    /// Content begins with a file-reference or wiki-link marker
    MalformedMarker(String),
    /// Trimmed content is below the minimum length
    TooShort { chars: usize },
    /// Short chunk dominated by navigation text
    Boilerplate(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContent => write!(f, "missing content"),
            Self::NonTextContent(kind) => write!(f, "non-string content (type: {})", kind),
            Self::Blank => write!(f, "content is whitespace only"),
            Self::MalformedMarker(prefix) => write!(f, "malformed content marker '{}'", prefix),
            Self::TooShort { chars } => write!(f, "too short ({} chars), likely metadata", chars),
            Self::Boilerplate(phrase) => write!(f, "navigation boilerplate ('{}')", phrase),
        }
    }
}

/// A chunk the sanitizer rejected, by position in the retrieval output
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedChunk {
    /// Zero-based index in the input sequence
    pub index: usize,
    pub reason: DropReason,
    /// First characters of the content, when it was text
    pub preview: Option<String>,
}

/// Sanitizer output plus what was dropped and why
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    pub kept: Vec<Chunk>,
    pub dropped: Vec<DroppedChunk>,
}

impl SanitizeReport {
    pub fn total(&self) -> usize {
        self.kept.len() + self.dropped.len()
    }
}

const PREVIEW_CHARS: usize = 50;

/// Filters raw retrieval records down to substantive text
#[derive(Debug, Clone)]
pub struct ChunkSanitizer {
    config: SanitizerConfig,
}

impl Default for ChunkSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}

impl ChunkSanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Keep only valid, substantive chunks, preserving order
    pub fn sanitize<I, C>(&self, chunks: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = C>,
        C: Into<RawChunk>,
    {
        self.sanitize_with_report(chunks).kept
    }

    /// Like [`sanitize`](Self::sanitize), also reporting every dropped chunk
    pub fn sanitize_with_report<I, C>(&self, chunks: I) -> SanitizeReport
    where
        I: IntoIterator<Item = C>,
        C: Into<RawChunk>,
    {
        let mut report = SanitizeReport::default();

        for (index, raw) in chunks.into_iter().map(Into::into).enumerate() {
            match self.check(&raw.content) {
                Ok(content) => {
                    let content = content.to_string();
                    report.kept.push(Chunk::from_validated(raw, content));
                }
                Err(reason) => {
                    let preview = raw
                        .content
                        .as_text()
                        .map(|text| text.trim().chars().take(PREVIEW_CHARS).collect());
                    report.dropped.push(DroppedChunk {
                        index,
                        reason,
                        preview,
                    });
                }
            }
        }

        report
    }

    /// Run the filter pipeline on one content field; first failing check wins
    pub fn check<'a>(&self, content: &'a RawContent) -> Result<&'a str, DropReason> {
        let text = match content {
            RawContent::Missing => return Err(DropReason::MissingContent),
            RawContent::NonText(kind) => return Err(DropReason::NonTextContent(kind.clone())),
            RawContent::Text(text) => text.as_str(),
        };

        let stripped = text.trim();
        if stripped.is_empty() {
            return Err(DropReason::Blank);
        }

        if let Some(prefix) = self
            .config
            .malformed_prefixes
            .iter()
            .find(|prefix| stripped.starts_with(prefix.as_str()))
        {
            return Err(DropReason::MalformedMarker(prefix.clone()));
        }

        let chars = stripped.chars().count();
        if chars < self.config.min_chunk_chars {
            return Err(DropReason::TooShort { chars });
        }

        if chars < self.config.boilerplate_max_chars {
            let lower = stripped.to_lowercase();
            if let Some(phrase) = self
                .config
                .boilerplate_phrases
                .iter()
                .find(|phrase| lower.contains(phrase.as_str()))
            {
                return Err(DropReason::Boilerplate(phrase.clone()));
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(content: &str) -> RawChunk {
        RawChunk::new(content, "https://book.example/page", 0, 0.6)
    }

    fn prose(len: usize) -> String {
        "Humanoid robots balance using feedback control. "
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    #[test]
    fn test_keeps_substantive_chunk_unchanged() {
        let content = format!("  {}  ", prose(150));
        let kept = ChunkSanitizer::default().sanitize(vec![raw(&content)]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, content);
    }

    #[test]
    fn test_drops_missing_and_non_text() {
        let sanitizer = ChunkSanitizer::default();
        let missing = RawChunk {
            content: RawContent::Missing,
            url: None,
            position: None,
            similarity_score: None,
        };
        let number = RawChunk {
            content: RawContent::NonText("number".into()),
            ..missing.clone()
        };

        let report = sanitizer.sanitize_with_report(vec![missing, number]);
        assert!(report.kept.is_empty());
        assert_eq!(report.dropped[0].reason, DropReason::MissingContent);
        assert_eq!(
            report.dropped[1].reason,
            DropReason::NonTextContent("number".into())
        );
        assert_eq!(report.dropped[1].preview, None);
    }

    #[test]
    fn test_drops_whitespace_only() {
        let report = ChunkSanitizer::default().sanitize_with_report(vec![raw(" \n\t ")]);
        assert_eq!(report.dropped[0].reason, DropReason::Blank);
    }

    #[test]
    fn test_drops_malformed_markers_regardless_of_length() {
        let sanitizer = ChunkSanitizer::default();
        let file_ref = format!("[File: chapter3.md] {}", prose(400));
        let wiki = format!("   [[Kinematics]] {}", prose(400));

        let report = sanitizer.sanitize_with_report(vec![raw(&file_ref), raw(&wiki)]);
        assert!(report.kept.is_empty());
        assert_eq!(
            report.dropped[0].reason,
            DropReason::MalformedMarker("[File:".into())
        );
        assert_eq!(report.dropped[1].reason, DropReason::MalformedMarker("[[".into()));
    }

    #[test]
    fn test_length_floor_counts_trimmed_chars() {
        let sanitizer = ChunkSanitizer::default();
        let padded = format!("{}{}", " ".repeat(60), prose(99));

        let report = sanitizer.sanitize_with_report(vec![raw(&padded), raw(&prose(100))]);
        assert_eq!(report.dropped[0].reason, DropReason::TooShort { chars: 99 });
        assert_eq!(report.kept.len(), 1);
    }

    #[test]
    fn test_length_floor_uses_chars_not_bytes() {
        // 100 two-byte characters are 200 bytes but exactly at the floor
        let accented = "é".repeat(100);
        assert_eq!(ChunkSanitizer::default().sanitize(vec![raw(&accented)]).len(), 1);
    }

    #[test]
    fn test_short_boilerplate_dropped_long_boilerplate_kept() {
        let sanitizer = ChunkSanitizer::default();
        let short_nav = format!("Edit this page. {}", prose(120));
        let long_nav = format!("Table of Contents. {}", prose(300));

        let report = sanitizer.sanitize_with_report(vec![raw(&short_nav), raw(&long_nav)]);
        assert_eq!(
            report.dropped[0].reason,
            DropReason::Boilerplate("edit this page".into())
        );
        assert_eq!(report.kept.len(), 1);
        assert_eq!(report.kept[0].content, long_nav);
    }

    #[test]
    fn test_order_and_indices_preserved() {
        let sanitizer = ChunkSanitizer::default();
        let a = prose(150);
        let b = format!("B {}", prose(180));
        let report = sanitizer.sanitize_with_report(vec![raw(&a), raw("tiny"), raw(&b)]);

        assert_eq!(report.kept.len(), 2);
        assert_eq!(report.kept[0].content, a);
        assert_eq!(report.kept[1].content, b);
        assert_eq!(report.dropped[0].index, 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_idempotent_on_sanitized_chunks() {
        let sanitizer = ChunkSanitizer::default();
        let once = sanitizer.sanitize(vec![raw(&prose(150)), raw("nav"), raw(&prose(220))]);
        let twice = sanitizer.sanitize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_drop_reason_display() {
        assert_eq!(
            DropReason::TooShort { chars: 42 }.to_string(),
            "too short (42 chars), likely metadata"
        );
    }
}
