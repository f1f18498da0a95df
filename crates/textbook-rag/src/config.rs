//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Retrieval call parameters
    pub retrieval: RetrievalConfig,
    /// Qdrant vector store
    pub qdrant: QdrantConfig,
    /// Query embedding model
    pub embeddings: EmbeddingConfig,
    /// Chunk sanitizer thresholds
    pub sanitizer: SanitizerConfig,
    /// Prompt size limits
    pub prompt: PromptBudget,
    /// Confidence bands
    pub confidence: ConfidenceThresholds,
    /// Generation backend selection and options
    pub generation: GenerationConfig,
    /// Ollama configuration
    pub llm: LlmConfig,
    /// Hugging Face Inference API configuration
    pub huggingface: HuggingFaceConfig,
}

impl RagConfig {
    /// Load configuration.
    ///
    /// Reads `path` when given, otherwise `<config dir>/textbook-rag/config.toml`
    /// if it exists, otherwise defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(|| {
            Self::default_path().filter(|p| p.exists())
        });

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(&path)?)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("textbook-rag").join("config.toml"))
    }

    /// Apply overrides from the environment (or any key lookup)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QDRANT_URL") {
            self.qdrant.url = url;
        }
        if let Some(key) = lookup("QDRANT_API_KEY") {
            self.qdrant.api_key = Some(key);
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            self.qdrant.collection = collection;
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(key) = lookup("HUGGINGFACE_API_KEY") {
            self.huggingface.api_key = Some(key);
        }
        if let Some(model) = lookup("HUGGINGFACE_MODEL") {
            self.huggingface.model = model;
        }
        if let Some(backend) = lookup("TEXTBOOK_RAG_BACKEND") {
            match backend.to_lowercase().as_str() {
                "ollama" => self.generation.backend = GenerationBackend::Ollama,
                "huggingface" | "hf" => self.generation.backend = GenerationBackend::HuggingFace,
                other => tracing::warn!("Ignoring unknown TEXTBOOK_RAG_BACKEND '{}'", other),
            }
        }
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if self.retrieval.timeout_secs == 0 || self.generation.timeout_secs == 0 {
            return Err(Error::config(
                "retrieval.timeout_secs and generation.timeout_secs must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return Err(Error::config("retrieval.similarity_threshold must be within [0, 1]"));
        }
        if self.prompt.max_chunks == 0 || self.prompt.max_chars_per_chunk == 0 {
            return Err(Error::config(
                "prompt.max_chunks and prompt.max_chars_per_chunk must be at least 1",
            ));
        }
        let ConfidenceThresholds { high, medium } = self.confidence;
        if !(0.0..=1.0).contains(&high) || !(0.0..=1.0).contains(&medium) || medium > high {
            return Err(Error::config(
                "confidence thresholds must satisfy 0 <= medium <= high <= 1",
            ));
        }
        if self.generation.backend == GenerationBackend::HuggingFace
            && self.huggingface.api_key.is_none()
        {
            return Err(Error::config(
                "huggingface backend selected but HUGGINGFACE_API_KEY is not set",
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Retrieval call parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages requested from the retriever
    pub top_k: usize,
    /// Minimum similarity for a passage to be returned
    pub similarity_threshold: f32,
    /// Upper bound on one retrieval call
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_threshold: 0.3,
            timeout_secs: 30,
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Qdrant vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    /// Qdrant REST base URL
    pub url: String,
    /// API key for Qdrant Cloud
    pub api_key: Option<String>,
    /// Collection holding the textbook passages
    pub collection: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "rag_embedding".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Query embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama embedding model; must match the model used to build the collection
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// Chunk sanitizer thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Chunks shorter than this (after trimming) are dropped
    pub min_chunk_chars: usize,
    /// Boilerplate-bearing chunks shorter than this are dropped
    pub boilerplate_max_chars: usize,
    /// Lowercase navigation phrases that mark a chunk as boilerplate
    pub boilerplate_phrases: Vec<String>,
    /// Prefixes left behind by broken upstream extraction
    pub malformed_prefixes: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            min_chunk_chars: 100,
            boilerplate_max_chars: 200,
            boilerplate_phrases: [
                "edit this page",
                "on this page",
                "table of contents",
                "previous next",
                "skip to content",
                "resources resources",
                "glossary glossary",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            malformed_prefixes: vec!["[File:".to_string(), "[[".to_string()],
        }
    }
}

/// Limits on how much retrieved text may enter the generation input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptBudget {
    /// Most chunks admitted into the prompt
    pub max_chunks: usize,
    /// Hard cut applied to each chunk's content
    pub max_chars_per_chunk: usize,
    /// Backend input ceiling in characters (512 T5 tokens is roughly 2000 chars)
    pub max_prompt_chars: usize,
    /// Topics suggested when nothing relevant was found
    pub domain_hint: String,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_chunks: 3,
            max_chars_per_chunk: 250,
            max_prompt_chars: 2000,
            domain_hint: "ROS 2, humanoid robotics, VLA systems, or simulation techniques"
                .to_string(),
        }
    }
}

/// Mean-similarity bands for the confidence label
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub high: f32,
    pub medium: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

/// Generation backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Hosted Hugging Face Inference API
    #[serde(alias = "hf")]
    HuggingFace,
}

/// Fixed decoding options sent with every generation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationOptions {
    /// Most tokens the backend may produce
    pub max_output_tokens: u32,
    /// Sampling temperature; 0.0 is greedy
    pub temperature: f32,
    /// Nucleus sampling mass
    pub top_p: f32,
    /// Seed for backends that support deterministic sampling
    pub seed: Option<u64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: 256,
            temperature: 0.0,
            top_p: 1.0,
            seed: Some(42),
        }
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub backend: GenerationBackend,
    pub options: GenerationOptions,
    /// Upper bound on one generation call
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            backend: GenerationBackend::default(),
            options: GenerationOptions::default(),
            timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts on transport failure (0 keeps one attempt per query)
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            generate_model: "flan-t5".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// Hugging Face Inference API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    /// Inference API base URL
    pub base_url: String,
    /// Model id
    pub model: String,
    /// API token
    pub api_key: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            model: "google/flan-t5-base".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}
