//! Errors surfaced by the orchestrator

use agora_agents::StageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebateError {
    /// Malformed configuration; rejected before the session starts
    #[error("Invalid debate configuration: {0}")]
    Validation(String),

    #[error("Stage error: {0}")]
    Stage(#[from] StageError),
}
