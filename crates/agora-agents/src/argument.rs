//! Arguments produced by debaters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extraction::Weakness;
use agora_core::Decision;

/// Debate phase an argument belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Opening,
    Rebuttal,
    Closing,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::Opening => "opening",
            ArgumentKind::Rebuttal => "rebuttal",
            ArgumentKind::Closing => "closing",
        }
    }
}

/// A generated argument with its extracted structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    pub id: Uuid,
    pub kind: ArgumentKind,
    pub content: String,
    /// Score in [0, 1]
    pub strength: f64,
    pub claims: Vec<String>,
    pub evidence: Vec<String>,
    pub weaknesses: Vec<Weakness>,
    pub counter_points: Vec<String>,
    /// Share of stance-aligned markers, in [0, 1]
    pub position: f64,
    pub created_at: DateTime<Utc>,
}

/// Scoring and provenance reported alongside an argument
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArgumentMetadata {
    pub confidence: f64,
    pub stance_consistency: f64,
    /// No claims were extracted; strength is capped
    pub low_evidence: bool,
    /// Opponent points this rebuttal responds to
    pub addressed_points: Vec<String>,
    /// Generation failed and the content is a placeholder
    pub degraded: bool,
    pub error: Option<String>,
    pub regenerated: bool,
    /// Disallowed terms still present after regeneration
    pub content_violation: Option<Vec<String>>,
    pub latency_ms: u64,
    pub word_count: usize,
}

/// What a debater returns for one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedArgument {
    pub argument: Argument,
    pub metadata: ArgumentMetadata,
    /// The approach chosen before speaking, when one cleared the floor
    pub decision: Option<Decision>,
}

impl GeneratedArgument {
    pub fn content(&self) -> &str {
        &self.argument.content
    }
}
