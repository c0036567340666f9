//! Beliefs with confidence, evidence and recorded contradictions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{unit_interval, AgentResult};
use crate::text;

/// Confidence multiplier applied each time a contradiction is recorded
pub const CONTRADICTION_DECAY: f64 = 0.8;
/// Fraction of the remaining headroom gained per reinforcing evidence item
pub const REINFORCEMENT_STEP: f64 = 0.05;
/// Term overlap at which two statements are considered about the same thing
pub const CONFLICT_OVERLAP: f64 = 0.3;

/// A held belief
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Belief {
    pub id: Uuid,
    pub content: String,
    confidence: f64,
    pub evidence: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub source: Option<String>,
    pub contradictions: Vec<Uuid>,
}

impl Belief {
    pub fn new(content: impl Into<String>, confidence: f64) -> AgentResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            content: content.into(),
            confidence: unit_interval("confidence", confidence)?,
            evidence: Vec::new(),
            last_updated: Utc::now(),
            source: None,
            contradictions: Vec::new(),
        })
    }

    /// Belief formed from an observation; out-of-range confidence is clamped
    pub fn observed(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            evidence: Vec::new(),
            last_updated: Utc::now(),
            source: None,
            contradictions: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn key_terms(&self) -> Vec<String> {
        text::key_terms(&self.content)
    }

    /// Overlap between this belief and a statement
    pub fn relevance(&self, statement: &str) -> f64 {
        text::jaccard(&self.key_terms(), &text::key_terms(statement))
    }

    /// A statement conflicts when it is about the same terms and exactly one
    /// side is negated
    pub fn conflicts_with(&self, statement: &str) -> bool {
        self.relevance(statement) >= CONFLICT_OVERLAP
            && text::has_negation(&self.content) != text::has_negation(statement)
    }
}

/// The beliefs held by one agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeliefSet {
    beliefs: Vec<Belief>,
}

impl BeliefSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, belief: Belief) -> Uuid {
        let id = belief.id;
        self.beliefs.push(belief);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&Belief> {
        self.beliefs.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.iter()
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    /// Lower a belief's confidence and remember what contradicted it.
    /// Returns the new confidence.
    pub fn record_contradiction(&mut self, id: Uuid, by: Uuid) -> Option<f64> {
        let belief = self.beliefs.iter_mut().find(|b| b.id == id)?;
        belief.confidence *= CONTRADICTION_DECAY;
        belief.contradictions.push(by);
        belief.last_updated = Utc::now();
        tracing::debug!(belief = %id, confidence = belief.confidence, "Belief contradicted");
        Some(belief.confidence)
    }

    /// Attach supporting evidence; confidence never decreases
    pub fn reinforce(&mut self, id: Uuid, evidence: &[String]) -> Option<f64> {
        let belief = self.beliefs.iter_mut().find(|b| b.id == id)?;
        for item in evidence {
            belief.evidence.push(item.clone());
            belief.confidence += REINFORCEMENT_STEP * (1.0 - belief.confidence);
        }
        if evidence.is_empty() {
            belief.confidence += REINFORCEMENT_STEP * (1.0 - belief.confidence);
        }
        belief.confidence = belief.confidence.min(1.0);
        belief.last_updated = Utc::now();
        Some(belief.confidence)
    }

    /// Beliefs sharing terms with `terms`, most confident first
    pub fn applicable(&self, terms: &[String], min_overlap: f64) -> Vec<&Belief> {
        let mut found: Vec<&Belief> = self
            .beliefs
            .iter()
            .filter(|b| text::coverage(&b.key_terms(), terms) > 0.0)
            .filter(|b| text::jaccard(&b.key_terms(), terms) >= min_overlap)
            .collect();
        found.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        found
    }

    /// Ids of beliefs the statement conflicts with
    pub fn conflicts(&self, statement: &str) -> Vec<Uuid> {
        self.beliefs
            .iter()
            .filter(|b| b.conflicts_with(statement))
            .map(|b| b.id)
            .collect()
    }

    /// Ids of beliefs the statement agrees with closely enough to reinforce
    pub fn agreeing(&self, statement: &str, min_overlap: f64) -> Vec<Uuid> {
        self.beliefs
            .iter()
            .filter(|b| !b.conflicts_with(statement) && b.relevance(statement) >= min_overlap)
            .map(|b| b.id)
            .collect()
    }
}
