//! Query orchestration: retrieval → sanitization → prompt → generation → response
//!
//! Each call to [`RagAgent::ask`] walks one query through the stages in
//! order and always produces a [`QueryResponse`]. A failed or timed-out
//! external call ends the query with an error response; nothing is retried
//! at this level.

pub mod observer;

pub use observer::{NoopObserver, PipelineObserver, TracingObserver};

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::timeout;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{GenerationOptions, RagConfig};
use crate::generation::PromptBudgeter;
use crate::providers::{LlmProvider, Retriever};
use crate::retrieval::{ChunkSanitizer, ConfidenceEstimator};
use crate::types::response::unique_sources;
use crate::types::QueryResponse;

/// Pipeline stage of one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStage {
    Start,
    Retrieving,
    Sanitizing,
    PromptBuilding,
    Generating,
    Responding,
    Failed,
}

/// Why a query ended in the `Failed` stage
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryFailure {
    #[error("Retrieval failed: {0}")]
    Retrieval(String),
    #[error("Retrieval timed out after {0:?}")]
    RetrievalTimeout(Duration),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),
}

impl QueryFailure {
    /// Stage in which the failure happened
    pub fn stage(&self) -> QueryStage {
        match self {
            Self::Retrieval(_) | Self::RetrievalTimeout(_) => QueryStage::Retrieving,
            Self::Generation(_) | Self::GenerationTimeout(_) => QueryStage::Generating,
        }
    }
}

/// Fixed per-call parameters for the external collaborators
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub retrieval_timeout: Duration,
    pub generation_timeout: Duration,
    pub generation: GenerationOptions,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&RagConfig::default())
    }
}

impl From<&RagConfig> for AgentSettings {
    fn from(config: &RagConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            similarity_threshold: config.retrieval.similarity_threshold,
            retrieval_timeout: config.retrieval.timeout(),
            generation_timeout: config.generation.timeout(),
            generation: config.generation.options.clone(),
        }
    }
}

/// Retrieval-augmented question answering agent
///
/// Holds no per-query state; one instance serves concurrent queries.
pub struct RagAgent {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    observer: Arc<dyn PipelineObserver>,
    settings: AgentSettings,
    sanitizer: ChunkSanitizer,
    budgeter: PromptBudgeter,
    estimator: ConfidenceEstimator,
}

impl RagAgent {
    /// Create an agent with default policy and a tracing observer
    pub fn new(retriever: Arc<dyn Retriever>, llm: Arc<dyn LlmProvider>) -> Self {
        Self::from_config(&RagConfig::default(), retriever, llm)
    }

    /// Create an agent whose policy comes from `config`
    pub fn from_config(
        config: &RagConfig,
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            retriever,
            llm,
            observer: Arc::new(TracingObserver),
            settings: AgentSettings::from(config),
            sanitizer: ChunkSanitizer::new(config.sanitizer.clone()),
            budgeter: PromptBudgeter::new(config.prompt.clone()),
            estimator: ConfidenceEstimator::new(config.confidence),
        }
    }

    /// Replace the observer
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Bound each external call by the given timeouts
    pub fn with_timeouts(mut self, retrieval: Duration, generation: Duration) -> Self {
        self.settings.retrieval_timeout = retrieval;
        self.settings.generation_timeout = generation;
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn sanitizer(&self) -> &ChunkSanitizer {
        &self.sanitizer
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Answer one question. Never fails: errors come back as a response
    /// with `status = error`.
    pub async fn ask(&self, query: &str) -> QueryResponse {
        let span = tracing::info_span!("query", id = %Uuid::new_v4());
        self.run(query).instrument(span).await
    }

    async fn run(&self, query: &str) -> QueryResponse {
        let start = Instant::now();
        self.enter(query, QueryStage::Start);

        let response = match self.execute(query, start).await {
            Ok(response) => response,
            Err(failure) => {
                self.enter(query, QueryStage::Failed);
                self.observer.query_failed(query, &failure);
                QueryResponse::failure(failure.to_string(), elapsed_ms(start))
            }
        };

        self.observer.query_completed(&response);
        response
    }

    async fn execute(&self, query: &str, start: Instant) -> Result<QueryResponse, QueryFailure> {
        self.enter(query, QueryStage::Retrieving);
        let retrieval = match timeout(
            self.settings.retrieval_timeout,
            self.retriever
                .retrieve(query, self.settings.top_k, self.settings.similarity_threshold),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return Err(QueryFailure::Retrieval(e.message())),
            Err(_) => return Err(QueryFailure::RetrievalTimeout(self.settings.retrieval_timeout)),
        };
        self.observer.retrieved(query, retrieval.total_results);

        self.enter(query, QueryStage::Sanitizing);
        let report = self.sanitizer.sanitize_with_report(retrieval.chunks);
        self.observer.sanitized(&report);
        let matched_chunks = report.kept;

        self.enter(query, QueryStage::PromptBuilding);
        let prompt = self.budgeter.build(query, &matched_chunks);
        self.observer
            .prompt_built(&prompt.text, prompt.chunks_used, prompt.fallback);

        self.enter(query, QueryStage::Generating);
        let answer = match timeout(
            self.settings.generation_timeout,
            self.llm.generate(&prompt.text, &self.settings.generation),
        )
        .await
        {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => return Err(QueryFailure::Generation(e.message())),
            Err(_) => {
                return Err(QueryFailure::GenerationTimeout(self.settings.generation_timeout))
            }
        };
        self.observer.answer_generated(&answer);

        self.enter(query, QueryStage::Responding);
        let used = self.budgeter.admitted(&matched_chunks);
        let confidence = self.estimator.estimate(used);
        let sources = unique_sources(used);

        Ok(QueryResponse::success(
            answer.trim(),
            sources,
            matched_chunks,
            confidence,
            elapsed_ms(start),
        ))
    }

    fn enter(&self, query: &str, stage: QueryStage) {
        self.observer.stage_entered(query, stage);
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_stage() {
        assert_eq!(
            QueryFailure::Retrieval("x".into()).stage(),
            QueryStage::Retrieving
        );
        assert_eq!(
            QueryFailure::GenerationTimeout(Duration::from_secs(1)).stage(),
            QueryStage::Generating
        );
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(
            QueryFailure::RetrievalTimeout(Duration::from_millis(1500)).to_string(),
            "Retrieval timed out after 1.5s"
        );
    }

    #[test]
    fn test_settings_from_config() {
        let settings = AgentSettings::default();
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.similarity_threshold, 0.3);
        assert_eq!(settings.generation.max_output_tokens, 256);
    }
}
