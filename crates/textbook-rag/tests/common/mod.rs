//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use textbook_rag::agent::NoopObserver;
use textbook_rag::config::GenerationOptions;
use textbook_rag::providers::{LlmProvider, Retriever};
use textbook_rag::retrieval::SanitizeReport;
use textbook_rag::{
    Error, PipelineObserver, QueryFailure, QueryStage, RagAgent, RawChunk, Result,
    RetrievalResult,
};

/// A passage long enough to survive the sanitizer
pub fn passage(topic: &str) -> String {
    format!(
        "{topic} is covered in depth in this chapter. The section walks through the core \
         concepts, the message flow between nodes, and a worked example on a humanoid robot."
    )
}

pub enum RetrieverBehavior {
    Chunks(Vec<RawChunk>),
    Fail(String),
    Hang(Duration),
}

/// Retriever that answers from a fixed script
pub struct FakeRetriever {
    behavior: RetrieverBehavior,
    pub calls: Mutex<Vec<(String, usize, f32)>>,
}

impl FakeRetriever {
    pub fn with_chunks(chunks: Vec<RawChunk>) -> Arc<Self> {
        Arc::new(Self {
            behavior: RetrieverBehavior::Chunks(chunks),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: RetrieverBehavior::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn hanging(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            behavior: RetrieverBehavior::Hang(delay),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Retriever for FakeRetriever {
    async fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> Result<RetrievalResult> {
        self.calls.lock().push((query.to_string(), top_k, threshold));
        match &self.behavior {
            RetrieverBehavior::Chunks(chunks) => {
                Ok(RetrievalResult::new(query, chunks.iter().take(top_k).cloned().collect()))
            }
            RetrieverBehavior::Fail(message) => Err(Error::retrieval(message.clone())),
            RetrieverBehavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(RetrievalResult::empty(query))
            }
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!matches!(self.behavior, RetrieverBehavior::Fail(_)))
    }

    fn name(&self) -> &str {
        "fake-retriever"
    }
}

/// Generation backend that records every prompt it receives
pub struct FakeLlm {
    answer: std::result::Result<String, String>,
    delay: Option<Duration>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(answer: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone().map_err(Error::llm)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.answer.is_ok())
    }

    fn name(&self) -> &str {
        "fake-llm"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    pub stages: Mutex<Vec<QueryStage>>,
    pub failures: Mutex<Vec<QueryFailure>>,
    pub dropped: Mutex<usize>,
    pub fallback: Mutex<Option<bool>>,
}

impl PipelineObserver for RecordingObserver {
    fn stage_entered(&self, _query: &str, stage: QueryStage) {
        self.stages.lock().push(stage);
    }

    fn sanitized(&self, report: &SanitizeReport) {
        *self.dropped.lock() = report.dropped.len();
    }

    fn prompt_built(&self, _prompt: &str, _chunks_used: usize, fallback: bool) {
        *self.fallback.lock() = Some(fallback);
    }

    fn query_failed(&self, _query: &str, failure: &QueryFailure) {
        self.failures.lock().push(failure.clone());
    }
}

/// Quiet agent around the given fakes
pub fn agent(retriever: Arc<FakeRetriever>, llm: Arc<FakeLlm>) -> RagAgent {
    RagAgent::new(retriever, llm).with_observer(Arc::new(NoopObserver))
}
