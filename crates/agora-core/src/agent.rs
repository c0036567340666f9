//! Agent types for agora
//!
//! The core [`Agent`] struct carries the cognitive state shared by every
//! debate role. The perceive/decide/act/learn loop lives in
//! [`crate::cognition`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

use crate::belief::BeliefSet;
use crate::content::ContentFilter;
use crate::goal::Goal;
use crate::memory::{Memory, MemoryKind, MemoryStore};
use crate::personality::Personality;

/// Unique identifier for an agent
pub type AgentId = Uuid;

/// Where the agent is in its cognitive loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Idle,
    Listening,
    Thinking,
    Speaking,
}

/// Current emotional colouring of the agent's responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Neutral,
    Engaged,
    Defensive,
    Persuasive,
    Analytical,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Engaged => "engaged",
            Emotion::Defensive => "defensive",
            Emotion::Persuasive => "persuasive",
            Emotion::Analytical => "analytical",
        }
    }
}

/// Configuration for creating a new agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Human-readable name for this agent
    pub name: String,
    /// Role description (used as the system prompt)
    pub role: String,
    /// Maximum number of stored memories
    pub memory_capacity: usize,
    /// Importance above which perceived input is remembered
    pub memory_threshold: f64,
    /// Context similarity required for a memory to be recalled
    pub similarity_threshold: f64,
    /// Minimum score a decision candidate must reach
    pub confidence_floor: f64,
    /// Maximum number of candidates considered per decision
    pub max_options: usize,
    /// Number of recent inputs kept in working memory
    pub working_memory_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Agent".to_string(),
            role: "Debate participant".to_string(),
            memory_capacity: 100,
            memory_threshold: 0.5,
            similarity_threshold: 0.5,
            confidence_floor: 0.2,
            max_options: 5,
            working_memory_size: 5,
        }
    }
}

impl AgentConfig {
    pub fn named(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }
}

/// Counters maintained across the loop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub decisions_made: u64,
    pub successful_actions: u64,
    pub failed_actions: u64,
    pub learning_events: u64,
    pub total_latency_ms: u64,
}

impl PerformanceMetrics {
    pub fn average_latency_ms(&self) -> f64 {
        if self.successful_actions == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.successful_actions as f64
        }
    }
}

/// Short-lived focus and recent inputs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingMemory {
    pub current_focus: Option<String>,
    pub active_goals: Vec<String>,
    pub recent_inputs: VecDeque<String>,
}

/// An agent taking part in a debate
#[derive(Debug, Clone)]
pub struct Agent {
    /// Unique identifier
    pub id: AgentId,
    /// Configuration
    pub config: AgentConfig,
    pub(crate) state: AgentState,
    pub(crate) emotion: Emotion,
    /// Held beliefs
    pub beliefs: BeliefSet,
    /// Bounded memory store
    pub memories: MemoryStore,
    /// Trait record shaping decisions and generation
    pub personality: Personality,
    /// Goals in priority order of insertion
    pub goals: Vec<Goal>,
    /// Loop counters
    pub metrics: PerformanceMetrics,
    /// Focus and recent inputs
    pub working_memory: WorkingMemory,
    /// Filter applied to everything the agent says
    pub filter: ContentFilter,
    /// When this agent was created
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(config: AgentConfig, personality: Personality) -> Self {
        let capacity = config.memory_capacity;
        Self {
            id: Uuid::new_v4(),
            config,
            state: AgentState::Idle,
            emotion: Emotion::Neutral,
            beliefs: BeliefSet::new(),
            memories: MemoryStore::new(capacity),
            personality,
            goals: Vec::new(),
            metrics: PerformanceMetrics::default(),
            working_memory: WorkingMemory::default(),
            filter: ContentFilter::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self.refresh_active_goals();
        self
    }

    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    /// Return to idle without acting, e.g. after a perception that needs no reply
    pub fn settle(&mut self) {
        self.transition(AgentState::Idle);
    }

    pub(crate) fn transition(&mut self, to: AgentState) {
        if self.state != to {
            tracing::trace!(agent = %self.config.name, from = ?self.state, to = ?to, "State change");
            self.state = to;
        }
    }

    /// Store a memory directly
    pub fn remember(
        &mut self,
        content: impl Into<String>,
        importance: f64,
        kind: MemoryKind,
        context: BTreeMap<String, String>,
    ) -> Option<Memory> {
        let mut memory = Memory::new(content, importance, kind);
        memory.context = context;
        self.memories.store(memory)
    }

    pub(crate) fn refresh_active_goals(&mut self) {
        self.working_memory.active_goals = self
            .goals
            .iter()
            .filter(|g| !g.is_achieved())
            .map(|g| g.description.clone())
            .collect();
    }
}
