//! Hugging Face Inference API provider (text-generation task)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Default instruction-tuned model
pub const DEFAULT_MODEL: &str = "HuggingFaceH4/zephyr-7b-beta";

/// Text-generation request body
#[derive(Debug, Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    repetition_penalty: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Provider backed by the hosted Hugging Face Inference API
#[derive(Debug)]
pub struct HuggingFaceProvider {
    /// API token
    api_token: String,
    /// Model repository id
    model: String,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL
    base_url: String,
}

impl HuggingFaceProvider {
    /// Create a new provider for `model`
    pub fn new(api_token: &str, model: &str) -> Self {
        Self {
            api_token: api_token.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            base_url: "https://api-inference.huggingface.co".to_string(),
        }
    }

    /// Create with the default zephyr model
    pub fn zephyr(api_token: &str) -> Self {
        Self::new(api_token, DEFAULT_MODEL)
    }

    /// Point at a self-hosted text-generation-inference endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    /// Zephyr chat template; the system prompt carries the agent's role
    fn render_prompt(request: &LlmRequest) -> String {
        format!(
            "<|system|>\n{}</s>\n<|user|>\n{}</s>\n<|assistant|>\n",
            request.system, request.prompt
        )
    }
}

/// Strip chat-template markers that sometimes leak into generations
fn clean_generation(text: &str) -> String {
    const MARKERS: [&str; 5] = ["<|assistant|>", "<|user|>", "<|system|>", "</s>", "```"];
    let mut cleaned = text.to_string();
    for marker in MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.endpoint())
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        let body = GenerationRequest {
            inputs: Self::render_prompt(&request),
            parameters: GenerationParameters {
                max_new_tokens: request.options.max_tokens,
                temperature: request.options.temperature,
                repetition_penalty: request.options.repetition_penalty,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            // Model is still loading on the shared inference cluster
            return Err(LlmError::NotAvailable);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let generations: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = generations
            .first()
            .map(|g| clean_generation(&g.generated_text))
            .ok_or_else(|| LlmError::InvalidResponse("empty generation list".to_string()))?;

        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse("blank generation".to_string()));
        }

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            tokens_used: None,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt_uses_chat_template() {
        let request = LlmRequest::with_role("You are a moderator.", "Introduce the topic.");
        let rendered = HuggingFaceProvider::render_prompt(&request);
        assert!(rendered.starts_with("<|system|>\nYou are a moderator."));
        assert!(rendered.ends_with("<|assistant|>\n"));
    }

    #[test]
    fn test_clean_generation_strips_markers() {
        let cleaned = clean_generation("<|assistant|>\nFirst point.\n\n\nSecond point.</s>");
        assert_eq!(cleaned, "First point.\nSecond point.");
    }

    #[test]
    fn test_endpoint() {
        let provider = HuggingFaceProvider::zephyr("token").with_base_url("http://localhost:8080/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/models/HuggingFaceH4/zephyr-7b-beta"
        );
    }

    #[tokio::test]
    #[ignore] // Requires HF_API_TOKEN
    async fn test_huggingface() {
        let token = std::env::var("HF_API_TOKEN").expect("HF_API_TOKEN not set");
        let provider = HuggingFaceProvider::zephyr(&token);

        if provider.is_available().await {
            let response = provider.ask("Say hello in one word").await.unwrap();
            assert!(!response.is_empty());
        }
    }
}
