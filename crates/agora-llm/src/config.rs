//! Provider configuration loaded from the environment

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::huggingface::DEFAULT_MODEL;
use crate::resilient_provider::RetryPolicy;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which generation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline prompt-aware mock
    Mock,
    /// Hugging Face Inference API
    HuggingFace,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            other => Err(ConfigError::Invalid(format!("unknown provider '{}'", other))),
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Selected backend (env: AGORA_PROVIDER)
    pub provider: ProviderKind,
    /// Hugging Face token (env: HF_API_TOKEN or HUGGINGFACEHUB_API_TOKEN)
    #[serde(skip_serializing)]
    pub huggingface_api_token: Option<String>,
    /// Model id (env: AGORA_MODEL)
    pub model: String,
    /// Per-call timeout in seconds (env: AGORA_TIMEOUT_SECS)
    pub timeout_secs: u64,
    /// Attempts per generation call (env: AGORA_MAX_RETRIES)
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mock,
            huggingface_api_token: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let provider = match env::var("AGORA_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.provider,
        };

        Ok(Self {
            provider,
            huggingface_api_token: env::var("HF_API_TOKEN")
                .or_else(|_| env::var("HUGGINGFACEHUB_API_TOKEN"))
                .ok(),
            model: env::var("AGORA_MODEL").unwrap_or(defaults.model),
            timeout_secs: parse_var("AGORA_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            max_retries: parse_var("AGORA_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
        })
    }

    /// Token for the selected backend, if it needs one
    pub fn api_token(&self) -> Result<Option<&str>, ConfigError> {
        match self.provider {
            ProviderKind::Mock => Ok(None),
            ProviderKind::HuggingFace => self
                .huggingface_api_token
                .as_deref()
                .map(Some)
                .ok_or_else(|| ConfigError::MissingEnvVar("HF_API_TOKEN".to_string())),
        }
    }

    /// Retry policy derived from the timeout and attempt settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries.max(1),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..RetryPolicy::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}
