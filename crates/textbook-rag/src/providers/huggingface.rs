//! Hugging Face Inference API client for hosted answer generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{GenerationOptions, HuggingFaceConfig};
use crate::error::{Error, Result};

use super::llm::LlmProvider;

/// Client for text generation models on the Hugging Face Inference API
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    top_p: f32,
    do_sample: bool,
    return_full_text: bool,
}

impl From<&GenerationOptions> for InferenceParameters {
    fn from(options: &GenerationOptions) -> Self {
        // The API rejects temperature 0; greedy decoding is expressed as do_sample=false
        let do_sample = options.temperature > 0.0;
        Self {
            max_new_tokens: options.max_output_tokens,
            temperature: do_sample.then_some(options.temperature),
            top_p: options.top_p,
            do_sample,
            return_full_text: false,
        }
    }
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// The API answers with either a list of generations or a single object
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
    Failure { error: String },
}

impl HuggingFaceClient {
    /// Create a new client; requires an API token
    pub fn new(config: &HuggingFaceConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::config("HUGGINGFACE_API_KEY is not set"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }
}

/// Extract the generated text from a raw response body
fn parse_generated_text(body: &str) -> Result<String> {
    let parsed: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| Error::llm(format!("Failed to parse inference response: {}", e)))?;

    match parsed {
        InferenceResponse::Many(mut items) if !items.is_empty() => {
            Ok(items.swap_remove(0).generated_text)
        }
        InferenceResponse::Many(_) => Err(Error::llm("Inference API returned no generations")),
        InferenceResponse::One(item) => Ok(item.generated_text),
        InferenceResponse::Failure { error } => Err(Error::llm(error)),
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceClient {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: options.into(),
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        tracing::debug!("Calling Hugging Face model {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::llm(format!("Inference request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::llm(format!("Failed to read inference response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::llm(format!("Inference failed: HTTP {} - {}", status, body)));
        }

        parse_generated_text(&body)
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .client
            .get(self.endpoint())
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_response() {
        let text = parse_generated_text(r#"[{"generated_text": "ROS 2 is middleware."}]"#).unwrap();
        assert_eq!(text, "ROS 2 is middleware.");
    }

    #[test]
    fn test_parse_error_response() {
        let err = parse_generated_text(r#"{"error": "Model is loading"}"#).unwrap_err();
        assert!(err.to_string().contains("Model is loading"));
        assert!(parse_generated_text("[]").is_err());
        assert!(parse_generated_text("not json").is_err());
    }

    #[test]
    fn test_greedy_parameters() {
        let params = InferenceParameters::from(&GenerationOptions::default());
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["do_sample"], false);
        assert_eq!(json["max_new_tokens"], 256);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_requires_api_key() {
        assert!(HuggingFaceClient::new(&HuggingFaceConfig::default()).is_err());
    }
}
