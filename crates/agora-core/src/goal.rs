//! Goals with priority, progress and optional subgoals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text;

/// Something an agent is working toward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
    pub priority: f64,
    progress: f64,
    pub deadline: Option<DateTime<Utc>>,
    pub subgoals: Vec<Goal>,
}

impl Goal {
    pub fn new(description: impl Into<String>, priority: f64) -> Self {
        Self {
            description: description.into(),
            priority: priority.clamp(0.0, 1.0),
            progress: 0.0,
            deadline: None,
            subgoals: Vec::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_subgoal(mut self, subgoal: Goal) -> Self {
        self.subgoals.push(subgoal);
        self
    }

    /// Progress in [0, 1]; with subgoals this is their mean
    pub fn progress(&self) -> f64 {
        if self.subgoals.is_empty() {
            self.progress
        } else {
            self.subgoals.iter().map(Goal::progress).sum::<f64>() / self.subgoals.len() as f64
        }
    }

    pub fn is_achieved(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_achieved() && self.deadline.is_some_and(|d| d < now)
    }

    /// Advance toward completion. With subgoals, the first open subgoal
    /// absorbs the delta. Returns the resulting progress.
    pub fn advance(&mut self, delta: f64) -> f64 {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        if let Some(open) = self.subgoals.iter_mut().find(|g| !g.is_achieved()) {
            open.advance(delta);
        } else if self.subgoals.is_empty() {
            self.progress = (self.progress + delta).min(1.0);
        }
        self.progress()
    }

    /// Priority-weighted overlap between the goal and some terms
    pub fn relevance(&self, terms: &[String]) -> f64 {
        if self.is_achieved() {
            return 0.0;
        }
        text::coverage(&text::key_terms(&self.description), terms) * self.priority
    }
}
