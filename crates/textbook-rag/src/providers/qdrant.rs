//! Qdrant retriever: embeds the query and searches a collection over REST

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::QdrantConfig;
use crate::error::{Error, Result};
use crate::types::{RawChunk, RetrievalResult};

use super::embedding::EmbeddingProvider;
use super::retriever::Retriever;

/// Retriever backed by a Qdrant collection
pub struct QdrantRetriever {
    client: Client,
    config: QdrantConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    score_threshold: f32,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    /// Null, missing or non-numeric scores leave the hit unscored
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Deserialize)]
struct CollectionResponse {
    result: CollectionInfo,
}

/// Subset of the collection info Qdrant reports
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub points_count: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl QdrantRetriever {
    /// Create a retriever for the configured collection
    pub fn new(config: QdrantConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            embedder,
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/collections/{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    /// Fetch collection status and point count
    pub async fn collection_info(&self) -> Result<CollectionInfo> {
        let response = self
            .authorize(self.client.get(self.collection_url()))
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("Qdrant request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::retrieval(format!(
                "Collection '{}' unavailable: HTTP {}",
                self.config.collection,
                response.status()
            )));
        }

        let info: CollectionResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse collection info: {}", e)))?;

        Ok(info.result)
    }
}

#[async_trait]
impl Retriever for QdrantRetriever {
    async fn retrieve(&self, query: &str, top_k: usize, threshold: f32) -> Result<RetrievalResult> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::retrieval(format!("Query embedding failed: {}", e.message())))?;

        let request = SearchRequest {
            vector: &vector,
            limit: top_k,
            score_threshold: threshold,
            with_payload: true,
        };

        let response = self
            .authorize(
                self.client
                    .post(format!("{}/points/search", self.collection_url()))
                    .json(&request),
            )
            .send()
            .await
            .map_err(|e| Error::retrieval(format!("Qdrant search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::retrieval(format!(
                "Qdrant search failed: HTTP {} - {}",
                status, body
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::retrieval(format!("Failed to parse search response: {}", e)))?;

        let chunks = search
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload.unwrap_or(Value::Null);
                let score = point.score.as_ref().and_then(Value::as_f64).map(|s| s as f32);
                RawChunk::from_payload(&payload, score)
            })
            .collect();

        Ok(RetrievalResult::new(query, chunks))
    }

    async fn health_check(&self) -> Result<bool> {
        match self.collection_info().await {
            Ok(info) => {
                tracing::debug!(
                    "Collection '{}' has {:?} points",
                    self.config.collection,
                    info.points_count
                );
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Qdrant health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
