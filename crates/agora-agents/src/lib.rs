//! # agora agents
//!
//! The three debate roles, each built on the cognitive loop from
//! `agora-core`:
//!
//! - [`DebateAgent`]: argues one side through opening, rebuttal and closing turns
//! - [`FactVerifier`]: extracts and verifies claims with a shared write-once cache
//! - [`ModeratorMonitor`]: owns the stage machine, checks every statement and
//!   produces the closing summary and analytics
//!
//! ## Quick Start
//!
//! ```rust
//! use agora_agents::extraction::analyze;
//!
//! let analysis = analyze("Studies from 2023 show that 68% of teams reported higher output.");
//! assert_eq!(analysis.claims.len(), 1);
//! assert!(!analysis.low_evidence());
//! ```

pub mod argument;
pub mod debater;
pub mod extraction;
pub mod fact_checker;
pub mod moderator;

pub use argument::{Argument, ArgumentKind, ArgumentMetadata, GeneratedArgument};
pub use debater::{DebateAgent, DebateParameters, DebateStyle, Stance};
pub use extraction::{Analysis, Weakness, WeaknessKind};
pub use fact_checker::{
    AccuracyLabel, FactCache, FactVerifier, StatementReport, VerificationResult,
    VerificationStatus, VerifierStats,
};
pub use moderator::{
    ClosingReport, DebateAnalytics, DebateFlow, DebateStage, DebateState, DebateSummary,
    Intervention, InterventionKind, ModeratorAction, ModeratorActionKind, ModeratorMonitor,
    MonitorPolicy, MonitorReport, Phase, Speaker, StageError, StageMachine, StageOutput,
    Submission,
};
