//! Debate session configuration

use agora_agents::{DebateParameters, DebateStyle};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::DebateError;

pub const ROUNDS: RangeInclusive<u8> = 1..=5;
pub const POINTS_PER_ARGUMENT: RangeInclusive<u8> = 1..=5;

/// Configuration for one debate session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    pub topic: String,
    pub style: DebateStyle,
    /// Rebuttal rounds between openings and closings
    pub rounds: u8,
    pub points_per_argument: u8,
    /// Speaking-time budget stated in debater prompts
    pub time_limit_secs: u32,
    pub fact_checking: bool,
    /// Log each debater's chosen approach
    pub show_thinking: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            style: DebateStyle::Formal,
            rounds: 3,
            points_per_argument: 3,
            time_limit_secs: 180,
            fact_checking: true,
            show_thinking: false,
        }
    }
}

impl DebateConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: DebateStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_rounds(mut self, rounds: u8) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_points(mut self, points: u8) -> Self {
        self.points_per_argument = points;
        self
    }

    pub fn with_fact_checking(mut self, enabled: bool) -> Self {
        self.fact_checking = enabled;
        self
    }

    pub fn with_show_thinking(mut self, enabled: bool) -> Self {
        self.show_thinking = enabled;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, DebateError> {
        serde_json::from_str(json).map_err(|e| DebateError::Validation(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DebateError> {
        if self.topic.trim().is_empty() {
            return Err(DebateError::Validation("topic must not be empty".into()));
        }
        if !ROUNDS.contains(&self.rounds) {
            return Err(DebateError::Validation(format!(
                "rounds must be between {} and {}, got {}",
                ROUNDS.start(),
                ROUNDS.end(),
                self.rounds
            )));
        }
        if !POINTS_PER_ARGUMENT.contains(&self.points_per_argument) {
            return Err(DebateError::Validation(format!(
                "points per argument must be between {} and {}, got {}",
                POINTS_PER_ARGUMENT.start(),
                POINTS_PER_ARGUMENT.end(),
                self.points_per_argument
            )));
        }
        if self.time_limit_secs == 0 {
            return Err(DebateError::Validation("time limit must be positive".into()));
        }
        Ok(())
    }

    pub fn parameters(&self) -> DebateParameters {
        DebateParameters {
            points_per_argument: self.points_per_argument,
            time_limit_secs: self.time_limit_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = DebateConfig::new("Remote work should be mandatory");
        assert!(config.validate().is_ok());
        assert_eq!(config.parameters().points_per_argument, 3);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let base = DebateConfig::new("Cats are better than dogs");
        assert!(matches!(base.clone().with_rounds(0).validate(), Err(DebateError::Validation(_))));
        assert!(matches!(base.clone().with_rounds(6).validate(), Err(DebateError::Validation(_))));
        assert!(matches!(base.clone().with_points(0).validate(), Err(DebateError::Validation(_))));
        assert!(matches!(base.with_points(9).validate(), Err(DebateError::Validation(_))));
        assert!(DebateConfig::new("   ").validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DebateConfig::from_json(r#"{"topic": "Homework should be banned", "style": "casual", "rounds": 2}"#)
            .unwrap();
        assert_eq!(config.style, DebateStyle::Casual);
        assert_eq!(config.rounds, 2);
        assert!(config.fact_checking);
        assert!(DebateConfig::from_json("{not json").is_err());
    }
}
