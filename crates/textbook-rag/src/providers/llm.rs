//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::config::GenerationOptions;
use crate::error::Result;

/// Trait for text generation from a fully assembled prompt
///
/// Implementations:
/// - `OllamaClient`: Local Ollama server
/// - `HuggingFaceClient`: Hosted Hugging Face Inference API
///
/// Implementations must be safe to share between concurrent queries.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for `prompt` using fixed decoding `options`
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
