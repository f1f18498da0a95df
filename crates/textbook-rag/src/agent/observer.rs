//! Pipeline observers: where drop counts, timings and previews get reported
//!
//! The pipeline never logs directly. It reports to a [`PipelineObserver`];
//! the server and CLI install [`TracingObserver`], tests install their own.

use super::{QueryFailure, QueryStage};
use crate::retrieval::SanitizeReport;
use crate::types::QueryResponse;

const PREVIEW_CHARS: usize = 200;

/// Receives progress events for one query at a time
///
/// All methods default to no-ops so implementations override only what they need.
pub trait PipelineObserver: Send + Sync {
    /// The query moved into `stage`
    fn stage_entered(&self, _query: &str, _stage: QueryStage) {}

    /// The retriever answered with `count` records
    fn retrieved(&self, _query: &str, _count: usize) {}

    /// Sanitization finished
    fn sanitized(&self, _report: &SanitizeReport) {}

    /// The prompt was assembled
    fn prompt_built(&self, _prompt: &str, _chunks_used: usize, _fallback: bool) {}

    /// The backend produced an answer
    fn answer_generated(&self, _answer: &str) {}

    /// The query failed at a stage
    fn query_failed(&self, _query: &str, _failure: &QueryFailure) {}

    /// The response is ready to return
    fn query_completed(&self, _response: &QueryResponse) {}
}

/// Observer that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Observer that forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn stage_entered(&self, _query: &str, stage: QueryStage) {
        tracing::trace!(?stage, "stage entered");
    }

    fn retrieved(&self, query: &str, count: usize) {
        tracing::info!("Retrieved {} chunks for query: '{}'", count, preview(query, 50));

        if count == 0 {
            tracing::warn!("No chunks retrieved from the vector store. Possible causes:");
            tracing::warn!("  1. The collection is empty");
            tracing::warn!("  2. The similarity threshold is too high");
            tracing::warn!("  3. Query embedding used a different model than the collection");
        }
    }

    fn sanitized(&self, report: &SanitizeReport) {
        for dropped in &report.dropped {
            match &dropped.preview {
                Some(text) => tracing::warn!(
                    "Skipping chunk {}: {}: {}...",
                    dropped.index + 1,
                    dropped.reason,
                    text
                ),
                None => tracing::warn!("Skipping chunk {}: {}", dropped.index + 1, dropped.reason),
            }
        }

        if !report.dropped.is_empty() {
            tracing::info!(
                "Sanitized chunks: kept {}/{} (skipped {} low-quality)",
                report.kept.len(),
                report.total(),
                report.dropped.len()
            );
        }
        if report.kept.is_empty() && report.total() > 0 {
            tracing::warn!("All retrieved chunks were filtered out during sanitization");
        }
    }

    fn prompt_built(&self, prompt: &str, chunks_used: usize, fallback: bool) {
        tracing::info!(
            "Prompt length: {} chars ({} context chunks{})",
            prompt.chars().count(),
            chunks_used,
            if fallback { ", fallback" } else { "" }
        );
        tracing::debug!("Prompt preview: {}...", preview(prompt, PREVIEW_CHARS));
    }

    fn answer_generated(&self, answer: &str) {
        tracing::info!("Generated answer length: {} chars", answer.chars().count());
        tracing::debug!("Answer preview: {}...", preview(answer, PREVIEW_CHARS));
    }

    fn query_failed(&self, query: &str, failure: &QueryFailure) {
        tracing::error!("Query '{}' failed: {}", preview(query, 50), failure);
    }

    fn query_completed(&self, response: &QueryResponse) {
        tracing::info!(
            "Query completed in {:.1}ms, status={:?}, confidence={}, {} sources",
            response.query_time_ms,
            response.status,
            response.confidence,
            response.sources.len()
        );
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_char_bounded() {
        assert_eq!(preview("héllo wörld", 4), "héll");
        assert_eq!(preview("ab", 10), "ab");
    }

    #[test]
    fn test_tracing_observer_handles_empty_report() {
        // No subscriber installed; this only checks nothing panics
        let observer = TracingObserver;
        observer.retrieved("q", 0);
        observer.sanitized(&SanitizeReport::default());
        observer.prompt_built("Question: q", 0, true);
    }
}
