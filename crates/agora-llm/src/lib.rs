//! # Agora LLM
//!
//! Text generation backends for agora debate agents.
//!
//! ## Supported Backends
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | Hugging Face | API | `HF_API_TOKEN` |
//! | Mock | Testing | None |
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_llm::{MockProvider, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let llm = MockProvider::smart();
//!     let response = llm.ask("Summarize the debate").await.unwrap();
//!     println!("{}", response);
//! }
//! ```
//!
//! ## Resilience
//!
//! ```rust
//! use agora_llm::{MockProvider, ResilientProvider};
//!
//! // 3 attempts, exponential backoff, 30s timeout, circuit breaker
//! let llm = ResilientProvider::wrap(MockProvider::smart());
//! ```

pub mod config;
pub mod huggingface;
pub mod mock;
pub mod provider;
pub mod resilient_provider;

pub use config::{ConfigError, LlmConfig, ProviderKind};
pub use huggingface::HuggingFaceProvider;
pub use mock::MockProvider;
pub use provider::{GenerationOptions, LlmError, LlmProvider, LlmRequest, LlmResponse};
pub use resilient_provider::{CircuitState, LlmCircuitConfig, ResilientProvider, RetryPolicy};
