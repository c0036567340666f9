//! # agora runtime
//!
//! Tokio-based debate orchestration: configuration validation, stage and
//! turn sequencing across the debaters, fact verifier and moderator, and the
//! append-only debate log.
//!
//! ```rust
//! use std::sync::Arc;
//! use agora_llm::MockProvider;
//! use agora_runtime::{DebateConfig, DebateOrchestrator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DebateConfig::new("Remote work should be mandatory").with_rounds(1);
//!     let orchestrator = DebateOrchestrator::new(config, Arc::new(MockProvider::smart())).unwrap();
//!     let outcome = orchestrator.run().await.unwrap();
//!     assert!(outcome.completed);
//! }
//! ```

pub mod config;
pub mod error;
pub mod log;
pub mod orchestrator;

pub use config::DebateConfig;
pub use error::DebateError;
pub use log::{DebateLog, EntryKind, LogEntry};
pub use orchestrator::{DebateOrchestrator, DebateOutcome, StopHandle};
