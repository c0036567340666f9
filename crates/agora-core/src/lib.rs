//! # agora core
//!
//! Shared cognitive machinery for debate agents:
//! - [`Agent`]: state, emotion, beliefs, memories, personality and goals
//! - [`cognition`]: the perceive → decide → act → learn loop
//! - [`ContentFilter`]: disallowed-term screening of generated text
//! - [`text`]: deterministic text heuristics used throughout

pub mod agent;
pub mod belief;
pub mod cognition;
pub mod content;
pub mod error;
pub mod goal;
pub mod memory;
pub mod personality;
pub mod text;

pub use agent::{Agent, AgentConfig, AgentId, AgentState, Emotion, PerformanceMetrics, WorkingMemory};
pub use belief::{Belief, BeliefSet};
pub use cognition::{
    ActionOutcome, ActionRequest, Candidate, Decision, DecisionContext, ExtractedInfo, Feedback,
    Input, InputKind, LearningOutcome, Perception,
};
pub use content::{ContentFilter, DISALLOWED_TERMS};
pub use error::{AgentError, AgentResult};
pub use goal::Goal;
pub use memory::{Memory, MemoryKind, MemoryStore};
pub use personality::{Personality, Trait};
pub use text::Sentiment;
