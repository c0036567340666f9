//! Error types shared by every agent variant

use agora_llm::LlmError;
use thiserror::Error;

/// Errors raised by the cognitive loop
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// The generation backend failed after its retry budget
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Output still contained disallowed terms after one regeneration
    #[error("Content violation: disallowed terms {terms:?}")]
    ContentViolation { terms: Vec<String>, text: String },

    /// No candidate cleared the confidence floor; caller supplies a default
    #[error("No candidate option cleared the confidence floor")]
    NoApplicableOption,

    /// Generation output could not be parsed into structured fields
    #[error("Could not parse generation output: {0}")]
    ParseFailure(String),

    /// A bounded score was constructed outside [0, 1]
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidValue { field: String, value: f64 },
}

/// Result alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Validate that `value` lies in the unit interval
pub fn unit_interval(field: &str, value: f64) -> AgentResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AgentError::InvalidValue {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_interval() {
        assert_eq!(unit_interval("x", 0.0).unwrap(), 0.0);
        assert_eq!(unit_interval("x", 1.0).unwrap(), 1.0);
        assert!(unit_interval("x", 1.01).is_err());
        assert!(unit_interval("x", f64::NAN).is_err());
    }
}
