//! Application state for the question-answering server

use serde::Serialize;
use std::sync::Arc;

use crate::agent::RagAgent;
use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::Providers;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Query pipeline (owns the retriever and LLM clients)
    agent: RagAgent,
}

/// Health of each external collaborator
#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorHealth {
    pub retriever: ProviderHealth,
    pub llm: ProviderHealth,
}

impl CollaboratorHealth {
    pub fn all_healthy(&self) -> bool {
        self.retriever.healthy && self.llm.healthy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderHealth {
    fn from_check(name: &str, check: Result<bool>) -> Self {
        match check {
            Ok(healthy) => Self {
                name: name.to_string(),
                healthy,
                error: None,
            },
            Err(e) => Self {
                name: name.to_string(),
                healthy: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl AppState {
    /// Create new application state with providers built from config
    pub fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let providers = Providers::from_config(&config)?;
        let agent = RagAgent::from_config(&config, providers.retriever, providers.llm);

        Ok(Self::with_agent(config, agent))
    }

    /// Create state around an existing agent
    pub fn with_agent(config: RagConfig, agent: RagAgent) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, agent }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the query pipeline
    pub fn agent(&self) -> &RagAgent {
        &self.inner.agent
    }

    /// Probe the retriever and generation backend concurrently
    pub async fn health(&self) -> CollaboratorHealth {
        let agent = self.agent();
        let (retriever, llm) =
            tokio::join!(agent.retriever().health_check(), agent.llm().health_check());

        CollaboratorHealth {
            retriever: ProviderHealth::from_check(agent.retriever().name(), retriever),
            llm: ProviderHealth::from_check(agent.llm().name(), llm),
        }
    }
}
