//! Debate moderation: the stage machine, the per-statement monitor and
//! closing analytics

use agora_core::{
    text, ActionRequest, Agent, AgentConfig, ContentFilter, Goal, Input, InputKind, Personality,
};
use agora_llm::LlmProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Simulated speaking rate used to turn words into seconds
pub const WORDS_PER_MINUTE: f64 = 150.0;

/// Participant in the debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Moderator,
    Proponent,
    Opponent,
    FactChecker,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Moderator => "Moderator",
            Speaker::Proponent => "Proponent",
            Speaker::Opponent => "Opponent",
            Speaker::FactChecker => "FactChecker",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debate stages, strictly ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStage {
    Introduction,
    Opening,
    Round(u8),
    /// Hand-off from the last round to closing statements
    Transition,
    Closing,
}

impl DebateStage {
    fn ordinal(&self) -> u16 {
        match self {
            DebateStage::Introduction => 0,
            DebateStage::Opening => 1,
            DebateStage::Round(k) => 1 + u16::from(*k),
            DebateStage::Transition => 1000,
            DebateStage::Closing => 1001,
        }
    }
}

impl PartialOrd for DebateStage {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DebateStage {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for DebateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateStage::Introduction => f.write_str("introduction"),
            DebateStage::Opening => f.write_str("opening"),
            DebateStage::Round(k) => write!(f, "round {k}"),
            DebateStage::Transition => f.write_str("transition"),
            DebateStage::Closing => f.write_str("closing"),
        }
    }
}

/// Sub-state within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// A speaker holds the floor
    Active,
    /// Normal flow is suspended by the moderator
    Intervention,
    /// Between turns, waiting for the next hand-over
    Transition,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("Cannot move from {from} back to {to}")]
    Backward { from: DebateStage, to: DebateStage },
}

/// Forward-only stage machine with an intervention sub-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMachine {
    current: DebateStage,
    phase: Phase,
    history: Vec<DebateStage>,
}

impl Default for StageMachine {
    fn default() -> Self {
        Self {
            current: DebateStage::Introduction,
            phase: Phase::Active,
            history: vec![DebateStage::Introduction],
        }
    }
}

impl StageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DebateStage {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stages entered so far, in order
    pub fn history(&self) -> &[DebateStage] {
        &self.history
    }

    /// Move forward; re-entering the current stage is a no-op
    pub fn advance(&mut self, to: DebateStage) -> Result<(), StageError> {
        if to < self.current {
            return Err(StageError::Backward {
                from: self.current,
                to,
            });
        }
        if to != self.current {
            self.current = to;
            self.history.push(to);
        }
        self.phase = Phase::Transition;
        Ok(())
    }

    pub fn interrupt(&mut self) {
        self.phase = Phase::Intervention;
    }

    /// Leave an intervention; control resumes at the transition step
    pub fn resume(&mut self) {
        self.phase = Phase::Transition;
    }

    pub fn begin_turn(&mut self) {
        self.phase = Phase::Active;
    }
}

/// Rule a statement can break, in descending priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    InappropriateContent,
    TimeViolation,
    Interruption,
    OffTopic,
}

impl InterventionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionKind::InappropriateContent => "inappropriate_content",
            InterventionKind::TimeViolation => "time_violation",
            InterventionKind::Interruption => "interruption",
            InterventionKind::OffTopic => "off_topic",
        }
    }

    /// Reason handed to the intervention prompt; never quotes the offending text
    pub fn reason(&self) -> &'static str {
        match self {
            InterventionKind::InappropriateContent => "inappropriate language",
            InterventionKind::TimeViolation => "exceeding the speaking time limit",
            InterventionKind::Interruption => "speaking out of turn",
            InterventionKind::OffTopic => "drifting away from the topic",
        }
    }
}

/// A recorded moderator intervention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intervention {
    pub kind: InterventionKind,
    /// Lower-priority violations found in the same statement
    pub also_detected: Vec<InterventionKind>,
    pub reason: String,
    pub speaker: Speaker,
    pub stage: DebateStage,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

/// Limits the monitor enforces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorPolicy {
    pub opening_limit_secs: f64,
    pub rebuttal_limit_secs: f64,
    pub closing_limit_secs: f64,
    pub off_topic_threshold: f64,
    pub words_per_minute: f64,
}

impl Default for MonitorPolicy {
    fn default() -> Self {
        Self {
            opening_limit_secs: 180.0,
            rebuttal_limit_secs: 120.0,
            closing_limit_secs: 180.0,
            off_topic_threshold: 0.5,
            words_per_minute: WORDS_PER_MINUTE,
        }
    }
}

impl MonitorPolicy {
    pub fn time_limit(&self, stage: DebateStage) -> Option<f64> {
        match stage {
            DebateStage::Opening => Some(self.opening_limit_secs),
            DebateStage::Round(_) => Some(self.rebuttal_limit_secs),
            DebateStage::Closing => Some(self.closing_limit_secs),
            DebateStage::Introduction | DebateStage::Transition => None,
        }
    }

    pub fn speaking_secs(&self, content: &str) -> f64 {
        text::word_count(content) as f64 * 60.0 / self.words_per_minute.max(1.0)
    }
}

/// Moderator-owned debate bookkeeping, exposed read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    pub topic: String,
    pub stage: DebateStage,
    pub speaker_order: Vec<Speaker>,
    /// Speaker who was last handed the floor
    pub current_speaker: Option<Speaker>,
    pub last_speaker: Option<Speaker>,
    /// Total simulated speaking seconds per speaker
    pub speaker_times: BTreeMap<Speaker, f64>,
    pub current_turn_secs: f64,
    pub interventions: Vec<Intervention>,
    pub inappropriate_content_count: u32,
    pub interruptions: u32,
    pub topic_adherence: f64,
    pub adherence_history: Vec<f64>,
    pub statements_reviewed: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl DebateState {
    pub fn new(topic: &str) -> Self {
        let speaker_order = vec![Speaker::Proponent, Speaker::Opponent];
        Self {
            topic: topic.to_string(),
            stage: DebateStage::Introduction,
            speaker_times: speaker_order.iter().map(|s| (*s, 0.0)).collect(),
            speaker_order,
            current_speaker: None,
            last_speaker: None,
            current_turn_secs: 0.0,
            interventions: Vec::new(),
            inappropriate_content_count: 0,
            interruptions: 0,
            topic_adherence: 1.0,
            adherence_history: Vec::new(),
            statements_reviewed: 0,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Next debater by rotation after the last one to speak
    pub fn next_speaker(&self) -> Speaker {
        let last = self.current_speaker.or(self.last_speaker);
        match last.and_then(|s| self.speaker_order.iter().position(|o| *o == s)) {
            Some(i) => self.speaker_order[(i + 1) % self.speaker_order.len()],
            None => self.speaker_order[0],
        }
    }
}

/// A statement submitted for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub speaker: Speaker,
    pub stage: DebateStage,
    pub content: String,
    pub speaking_secs: f64,
    /// Placeholder text standing in for a failed generation
    pub degraded: bool,
}

impl Submission {
    /// Speaking time is derived from word count at the policy rate
    pub fn new(speaker: Speaker, stage: DebateStage, content: &str, policy: &MonitorPolicy) -> Self {
        Self {
            speaker,
            stage,
            content: content.to_string(),
            speaking_secs: policy.speaking_secs(content),
            degraded: false,
        }
    }

    pub fn degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }
}

/// Outcome of the four checks on one statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorReport {
    /// Highest priority first
    pub violations: Vec<InterventionKind>,
    pub topic_relevance: f64,
    pub adherence_after: f64,
    pub speaking_secs: f64,
    pub inappropriate_terms: Vec<String>,
}

impl MonitorReport {
    pub fn primary(&self) -> Option<InterventionKind> {
        self.violations.first().copied()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Coverage of the topic's key terms by the statement; 1.0 for an empty topic
pub fn topic_relevance(topic: &str, content: &str) -> f64 {
    let topic_terms = text::key_terms(topic);
    if topic_terms.is_empty() {
        return 1.0;
    }
    text::coverage(&topic_terms, &text::key_terms(content))
}

/// Run the four independent checks without touching any state
pub fn evaluate(
    state: &DebateState,
    policy: &MonitorPolicy,
    filter: &ContentFilter,
    submission: &Submission,
) -> MonitorReport {
    let mut violations = Vec::new();

    let inappropriate_terms = filter.violations(&submission.content);
    if !inappropriate_terms.is_empty() {
        violations.push(InterventionKind::InappropriateContent);
    }

    let elapsed = state.current_turn_secs + submission.speaking_secs;
    if policy.time_limit(submission.stage).is_some_and(|limit| elapsed > limit) {
        violations.push(InterventionKind::TimeViolation);
    }

    let expected = state.current_speaker.or(state.last_speaker);
    if expected.is_some_and(|s| s != submission.speaker) {
        violations.push(InterventionKind::Interruption);
    }

    // A placeholder says nothing about the speaker's adherence
    let (relevance, adherence_after) = if submission.degraded {
        (0.0, state.topic_adherence)
    } else {
        let relevance = topic_relevance(&state.topic, &submission.content);
        (relevance, ((state.topic_adherence + relevance) / 2.0).min(1.0))
    };
    if !submission.degraded && adherence_after < policy.off_topic_threshold {
        violations.push(InterventionKind::OffTopic);
    }

    violations.sort();
    MonitorReport {
        violations,
        topic_relevance: relevance,
        adherence_after,
        speaking_secs: submission.speaking_secs,
        inappropriate_terms,
    }
}

/// Sections of the moderator's debate summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateSummary {
    pub key_points: Vec<String>,
    pub evidence: Vec<String>,
    pub disagreements: Vec<String>,
    pub consensus: Vec<String>,
}

impl DebateSummary {
    /// Parse headed sections; unrecognised text yields empty sections
    pub fn parse(response: &str) -> Self {
        let mut summary = Self::default();
        let mut section: Option<&mut Vec<String>> = None;
        for raw in response.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let lower = line.to_lowercase();
            let is_header = lower.ends_with(':')
                || lower.chars().next().is_some_and(|c| c.is_ascii_digit());
            if is_header {
                if lower.contains("argument") || lower.contains("key point") {
                    section = Some(&mut summary.key_points);
                    continue;
                } else if lower.contains("evidence") {
                    section = Some(&mut summary.evidence);
                    continue;
                } else if lower.contains("disagree") {
                    section = Some(&mut summary.disagreements);
                    continue;
                } else if lower.contains("consensus") || lower.contains("agreement") {
                    section = Some(&mut summary.consensus);
                    continue;
                }
            }
            if let Some(items) = section.as_mut() {
                let item = line.trim_start_matches(|c: char| c == '-' || c == '*' || c == '•').trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
            }
        }
        summary
    }
}

/// Flow counters reported at closing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateFlow {
    pub interruptions: u32,
    pub inappropriate_content: u32,
    pub interventions_needed: usize,
    pub topic_coverage: f64,
}

/// Closing analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateAnalytics {
    pub duration_secs: f64,
    pub speaker_balance: f64,
    pub topic_adherence: f64,
    pub topic_adherence_trend: Vec<f64>,
    /// Keyed by primary intervention kind
    pub intervention_counts: BTreeMap<String, usize>,
    pub total_interventions: usize,
    pub speaker_times: BTreeMap<String, f64>,
    pub flow: DebateFlow,
}

/// `1 - variance / mean^2` over the two debaters; 1.0 when neither spoke
pub fn speaker_balance(pro_secs: f64, con_secs: f64) -> f64 {
    let mean = (pro_secs + con_secs) / 2.0;
    if mean <= 0.0 {
        return 1.0;
    }
    let variance = ((pro_secs - mean).powi(2) + (con_secs - mean).powi(2)) / 2.0;
    (1.0 - variance / (mean * mean)).clamp(0.0, 1.0)
}

/// Kind of moderator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeratorActionKind {
    Introduction,
    Transition,
    Intervention,
    Closing,
}

/// A message the moderator delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorAction {
    pub kind: ModeratorActionKind,
    pub stage: DebateStage,
    pub content: String,
    /// Generation failed and a fixed message was used
    pub degraded: bool,
}

/// Everything produced when the debate closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingReport {
    pub action: ModeratorAction,
    pub summary: DebateSummary,
    pub analytics: DebateAnalytics,
}

/// What [`ModeratorMonitor::moderate`] produced for a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageOutput {
    Action(ModeratorAction),
    Closing(ClosingReport),
}

impl StageOutput {
    pub fn action(&self) -> &ModeratorAction {
        match self {
            StageOutput::Action(action) => action,
            StageOutput::Closing(report) => &report.action,
        }
    }

    pub fn closing(&self) -> Option<&ClosingReport> {
        match self {
            StageOutput::Closing(report) => Some(report),
            StageOutput::Action(_) => None,
        }
    }
}

/// The moderator agent; sole owner of [`DebateState`]
#[derive(Debug)]
pub struct ModeratorMonitor<L: LlmProvider> {
    agent: Agent,
    llm: Arc<L>,
    state: DebateState,
    machine: StageMachine,
    policy: MonitorPolicy,
    transcript: Vec<String>,
}

impl<L: LlmProvider> ModeratorMonitor<L> {
    pub fn new(topic: &str, llm: Arc<L>) -> Self {
        let config = AgentConfig::named(
            "Moderator",
            "You are a neutral, fair debate moderator. Keep the discussion orderly, \
             on topic and respectful, and never take sides.",
        );
        let agent = Agent::new(config, Personality::moderator())
            .with_goal(Goal::new("Ensure fair debate", 1.0))
            .with_goal(Goal::new("Maintain productive discussion", 0.9));
        Self {
            agent,
            llm,
            state: DebateState::new(topic),
            machine: StageMachine::new(),
            policy: MonitorPolicy::default(),
            transcript: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: MonitorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &DebateState {
        &self.state
    }

    pub fn policy(&self) -> &MonitorPolicy {
        &self.policy
    }

    pub fn stage(&self) -> DebateStage {
        self.machine.current()
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &StageMachine {
        &self.machine
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn advance(&mut self, to: DebateStage) -> Result<(), StageError> {
        self.machine.advance(to)?;
        self.state.stage = to;
        tracing::info!(stage = %to, "Stage changed");
        Ok(())
    }

    /// Give the floor to `next` and reset the turn timer
    pub fn record_handover(&mut self, next: Speaker) {
        if self.state.current_speaker.is_some() {
            self.state.last_speaker = self.state.current_speaker;
        }
        self.state.current_speaker = Some(next);
        self.state.current_turn_secs = 0.0;
        self.machine.begin_turn();
        tracing::debug!(speaker = %next, "Floor handed over");
    }

    /// Run the monitor on one statement and record the outcome
    pub fn review(&mut self, submission: &Submission) -> MonitorReport {
        let report = evaluate(&self.state, &self.policy, &self.agent.filter, submission);

        *self.state.speaker_times.entry(submission.speaker).or_insert(0.0) += submission.speaking_secs;
        self.state.current_turn_secs += submission.speaking_secs;
        if !submission.degraded {
            self.state.topic_adherence = report.adherence_after;
            self.state.adherence_history.push(report.adherence_after);
        }
        self.state.statements_reviewed += 1;
        self.transcript
            .push(format!("{}: {}", submission.speaker, submission.content));

        self.agent.perceive(
            Input::new(InputKind::Argument, submission.content.clone())
                .from_source(submission.speaker.as_str()),
        );
        self.agent.settle();

        for kind in &report.violations {
            match kind {
                InterventionKind::InappropriateContent => self.state.inappropriate_content_count += 1,
                InterventionKind::Interruption => self.state.interruptions += 1,
                InterventionKind::TimeViolation | InterventionKind::OffTopic => {}
            }
        }

        if let Some(primary) = report.primary() {
            self.state.interventions.push(Intervention {
                kind: primary,
                also_detected: report.violations[1..].to_vec(),
                reason: primary.reason().to_string(),
                speaker: submission.speaker,
                stage: submission.stage,
                timestamp: Utc::now(),
                message: None,
            });
            self.machine.interrupt();
            metrics::counter!("agora_interventions_total", "kind" => primary.as_str()).increment(1);
            tracing::warn!(
                speaker = %submission.speaker,
                stage = %submission.stage,
                kind = primary.as_str(),
                also = ?&report.violations[1..],
                "Intervention required"
            );
        } else {
            for goal in self.agent.goals.iter_mut() {
                goal.advance(0.05);
            }
        }

        self.state.current_speaker = Some(submission.speaker);
        report
    }

    /// Stage-specific moderator output
    pub async fn moderate(&mut self, stage: DebateStage) -> StageOutput {
        match stage {
            DebateStage::Introduction => StageOutput::Action(self.introduce().await),
            DebateStage::Closing => StageOutput::Closing(self.close().await),
            DebateStage::Transition | DebateStage::Opening | DebateStage::Round(_) => {
                let next = self.state.next_speaker();
                StageOutput::Action(self.transition(next).await)
            }
        }
    }

    pub async fn introduce(&mut self) -> ModeratorAction {
        self.state.started_at = Utc::now();
        let prompt = format!(
            "Write a debate introduction.\n\
             Topic: {topic}\n\
             Requirements:\n\
             - Welcome the audience and introduce the topic\n\
             - Explain why the topic matters\n\
             - Set expectations for the debate\n\
             - Keep a neutral tone with no meta-text\n\
             Maximum 130 words.",
            topic = self.state.topic
        );
        let fallback = format!("Welcome to today's debate on the motion that {}.", self.state.topic);
        self.speak(ModeratorActionKind::Introduction, prompt, fallback).await
    }

    /// Acknowledge the previous speaker and hand the floor to `next`
    pub async fn transition(&mut self, next: Speaker) -> ModeratorAction {
        let last = self
            .state
            .current_speaker
            .map(|s| s.as_str())
            .unwrap_or("none");
        let prompt = format!(
            "Write a transition statement.\n\
             Topic: {topic}\n\
             Last Speaker: {last}\n\
             Next Speaker: {next}\n\
             Requirements:\n\
             - Briefly acknowledge the previous speaker\n\
             - Hand off clearly to the next speaker\n\
             - Neutral tone\n\
             Maximum 50 words.",
            topic = self.state.topic
        );
        let fallback = format!("Thank you. The floor now passes to the {next}.");
        let action = self.speak(ModeratorActionKind::Transition, prompt, fallback).await;
        self.record_handover(next);
        action
    }

    /// Deliver the message for the most recent intervention, then resume at
    /// the transition step
    pub async fn intervene(&mut self) -> Option<ModeratorAction> {
        let intervention = self.state.interventions.last()?.clone();
        if intervention.message.is_some() {
            return None;
        }
        let prompt = format!(
            "Write a moderator intervention.\n\
             Topic: {topic}\n\
             Speaker: {speaker}\n\
             Reason: {reason}\n\
             Requirements:\n\
             - Diplomatic but firm tone\n\
             - Explain the issue clearly\n\
             - Give specific guidance for correction\n\
             - Stay neutral\n\
             Maximum 75 words.",
            topic = self.state.topic,
            speaker = intervention.speaker,
            reason = intervention.reason,
        );
        let fallback = format!(
            "Let us pause for a moment because of {}. Please return to the motion and follow the agreed rules.",
            intervention.reason
        );
        let action = self.speak(ModeratorActionKind::Intervention, prompt, fallback).await;
        if let Some(last) = self.state.interventions.last_mut() {
            last.message = Some(action.content.clone());
        }
        self.machine.resume();
        Some(action)
    }

    /// Summarise, thank the participants and compute analytics
    pub async fn close(&mut self) -> ClosingReport {
        let summary_prompt = format!(
            "Summarize the key points from this debate.\n\
             Topic: {topic}\n\
             Content:\n{content}\n\n\
             Extract:\n\
             Main arguments:\n\
             Key evidence:\n\
             Points of disagreement:\n\
             Areas of consensus:",
            topic = self.state.topic,
            content = self.transcript.join("\n"),
        );
        let summary = match self.agent.act(self.llm.as_ref(), ActionRequest::new(summary_prompt)).await {
            Ok(outcome) => DebateSummary::parse(&outcome.text),
            Err(err) => {
                tracing::warn!(error = %err, "Debate summary unavailable");
                DebateSummary::default()
            }
        };

        let key_points = if summary.key_points.is_empty() {
            "- (none recorded)".to_string()
        } else {
            summary
                .key_points
                .iter()
                .map(|p| format!("- {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = format!(
            "Write the moderator's closing remarks.\n\
             Topic: {topic}\n\
             Key Points:\n{key_points}\n\
             Requirements:\n\
             - Thank the participants\n\
             - Summarise the key points discussed\n\
             - No personal opinions and no meta-text\n\
             Maximum 100 words.",
            topic = self.state.topic
        );
        let fallback = format!(
            "Thank you to both speakers for the debate on the motion that {}.",
            self.state.topic
        );
        let action = self.speak(ModeratorActionKind::Closing, prompt, fallback).await;
        self.state.ended_at = Some(Utc::now());

        ClosingReport {
            action,
            summary,
            analytics: self.analytics(),
        }
    }

    pub fn analytics(&self) -> DebateAnalytics {
        let end = self.state.ended_at.unwrap_or_else(Utc::now);
        let duration_secs = (end - self.state.started_at).num_milliseconds().max(0) as f64 / 1000.0;
        let time_of = |s: Speaker| self.state.speaker_times.get(&s).copied().unwrap_or(0.0);

        let mut intervention_counts: BTreeMap<String, usize> = BTreeMap::new();
        for intervention in &self.state.interventions {
            *intervention_counts
                .entry(intervention.kind.as_str().to_string())
                .or_insert(0) += 1;
        }

        DebateAnalytics {
            duration_secs,
            speaker_balance: speaker_balance(time_of(Speaker::Proponent), time_of(Speaker::Opponent)),
            topic_adherence: self.state.topic_adherence,
            topic_adherence_trend: self.state.adherence_history.clone(),
            intervention_counts,
            total_interventions: self.state.interventions.len(),
            speaker_times: self
                .state
                .speaker_times
                .iter()
                .map(|(s, t)| (s.as_str().to_string(), *t))
                .collect(),
            flow: DebateFlow {
                interruptions: self.state.interruptions,
                inappropriate_content: self.state.inappropriate_content_count,
                interventions_needed: self.state.interventions.len(),
                topic_coverage: self.state.topic_adherence,
            },
        }
    }

    async fn speak(&mut self, kind: ModeratorActionKind, prompt: String, fallback: String) -> ModeratorAction {
        let stage = self.machine.current();
        match self.agent.act(self.llm.as_ref(), ActionRequest::new(prompt)).await {
            Ok(outcome) => ModeratorAction {
                kind,
                stage,
                content: outcome.text.trim().to_string(),
                degraded: false,
            },
            Err(err) => {
                tracing::warn!(?kind, error = %err, "Moderator message degraded");
                ModeratorAction {
                    kind,
                    stage,
                    content: fallback,
                    degraded: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_llm::{LlmError, MockProvider};

    const TOPIC: &str = "Remote work should be mandatory";

    fn monitor() -> ModeratorMonitor<MockProvider> {
        ModeratorMonitor::new(TOPIC, Arc::new(MockProvider::smart()))
    }

    fn submit(m: &ModeratorMonitor<MockProvider>, speaker: Speaker, content: &str) -> Submission {
        Submission::new(speaker, m.stage(), content, m.policy())
    }

    #[test]
    fn test_stage_machine_is_forward_only() {
        let mut machine = StageMachine::new();
        machine.advance(DebateStage::Opening).unwrap();
        machine.advance(DebateStage::Round(1)).unwrap();
        machine.advance(DebateStage::Round(2)).unwrap();
        let err = machine.advance(DebateStage::Round(1)).unwrap_err();
        assert_eq!(
            err,
            StageError::Backward {
                from: DebateStage::Round(2),
                to: DebateStage::Round(1)
            }
        );
        machine.interrupt();
        assert_eq!(machine.phase(), Phase::Intervention);
        machine.resume();
        assert_eq!(machine.phase(), Phase::Transition);
        assert_eq!(machine.current(), DebateStage::Round(2));
        machine.advance(DebateStage::Closing).unwrap();
        assert_eq!(
            machine.history(),
            &[
                DebateStage::Introduction,
                DebateStage::Opening,
                DebateStage::Round(1),
                DebateStage::Round(2),
                DebateStage::Closing
            ]
        );
    }

    #[test]
    fn test_stage_ordering() {
        assert!(DebateStage::Introduction < DebateStage::Opening);
        assert!(DebateStage::Opening < DebateStage::Round(1));
        assert!(DebateStage::Round(5) < DebateStage::Transition);
        assert!(DebateStage::Transition < DebateStage::Closing);
    }

    #[test]
    fn test_speaker_balance() {
        assert_eq!(speaker_balance(60.0, 60.0), 1.0);
        assert_eq!(speaker_balance(0.0, 0.0), 1.0);
        assert!((speaker_balance(90.0, 30.0) - 0.75).abs() < 1e-9);
        assert_eq!(speaker_balance(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_clean_statement_passes() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        let s = submit(&m, Speaker::Proponent, "Remote work should be mandatory because it saves commuting time.");
        let report = m.review(&s);
        assert!(report.is_clean());
        assert!(m.state().interventions.is_empty());
        assert_eq!(m.phase(), Phase::Active);
    }

    #[test]
    fn test_interruption_detected() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        let s = submit(&m, Speaker::Opponent, "Remote work should not be mandatory at all.");
        let report = m.review(&s);
        assert_eq!(report.primary(), Some(InterventionKind::Interruption));
        assert_eq!(m.state().interruptions, 1);
        assert_eq!(m.phase(), Phase::Intervention);
    }

    #[test]
    fn test_time_violation() {
        let mut m = monitor();
        m.advance(DebateStage::Round(1)).unwrap();
        m.record_handover(Speaker::Proponent);
        let long = format!("Remote work should be mandatory. {}", "word ".repeat(320));
        let report = m.review(&submit(&m, Speaker::Proponent, &long));
        assert_eq!(report.primary(), Some(InterventionKind::TimeViolation));
        assert!(report.speaking_secs > 120.0);
    }

    #[test]
    fn test_off_topic_after_drift() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        let first = m.review(&submit(&m, Speaker::Proponent, "Let me talk about football tactics instead."));
        assert!(first.is_clean());
        m.record_handover(Speaker::Proponent);
        let second = m.review(&submit(&m, Speaker::Proponent, "Football tactics matter a great deal."));
        assert_eq!(second.primary(), Some(InterventionKind::OffTopic));
        assert!(m.state().topic_adherence < 0.5);
    }

    #[test]
    fn test_one_intervention_per_statement() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        let s = submit(&m, Speaker::Opponent, "That is an offensive and hateful remark.");
        let report = m.review(&s);
        assert_eq!(
            report.violations,
            vec![InterventionKind::InappropriateContent, InterventionKind::Interruption]
        );
        let state = m.state();
        assert_eq!(state.interventions.len(), 1);
        assert_eq!(state.interventions[0].kind, InterventionKind::InappropriateContent);
        assert_eq!(state.interventions[0].also_detected, vec![InterventionKind::Interruption]);
        assert_eq!(state.inappropriate_content_count, 1);
        assert_eq!(state.interruptions, 1);
    }

    #[tokio::test]
    async fn test_intervention_message_and_resume() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        m.review(&submit(&m, Speaker::Opponent, "Remote work should be mandatory, I must interject."));
        let action = m.intervene().await.unwrap();
        assert_eq!(action.kind, ModeratorActionKind::Intervention);
        assert!(action.content.contains("speaking out of turn"));
        assert_eq!(m.phase(), Phase::Transition);
        assert!(m.state().interventions[0].message.is_some());
        assert!(m.intervene().await.is_none());
    }

    #[tokio::test]
    async fn test_transition_hands_over() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        let output = m.moderate(DebateStage::Opening).await;
        assert!(output.closing().is_none());
        let action = output.action();
        assert_eq!(action.kind, ModeratorActionKind::Transition);
        assert!(action.content.contains("Opponent"));
        assert_eq!(m.state().current_speaker, Some(Speaker::Opponent));
    }

    #[tokio::test]
    async fn test_close_produces_summary_and_analytics() {
        let mut m = monitor();
        m.introduce().await;
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        m.review(&submit(&m, Speaker::Proponent, "Remote work should be mandatory for cost reasons."));
        m.record_handover(Speaker::Opponent);
        m.review(&submit(&m, Speaker::Opponent, "Remote work should not be mandatory for every team."));
        m.advance(DebateStage::Closing).unwrap();
        let report = m.close().await;
        assert_eq!(report.action.kind, ModeratorActionKind::Closing);
        assert_eq!(report.summary.key_points.len(), 2);
        assert_eq!(report.summary.consensus.len(), 1);
        assert_eq!(report.analytics.total_interventions, 0);
        assert_eq!(report.analytics.topic_adherence_trend.len(), 2);
        assert!(report.analytics.speaker_balance > 0.9);
        assert!(m.state().ended_at.is_some());
    }

    #[tokio::test]
    async fn test_moderate_closing_keeps_summary_and_analytics() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        m.record_handover(Speaker::Proponent);
        m.review(&submit(&m, Speaker::Proponent, "Remote work should be mandatory for cost reasons."));
        m.advance(DebateStage::Closing).unwrap();
        let output = m.moderate(DebateStage::Closing).await;
        let report = output.closing().unwrap();
        assert_eq!(output.action().kind, ModeratorActionKind::Closing);
        assert_eq!(report.summary.key_points.len(), 2);
        assert_eq!(report.analytics.topic_adherence_trend.len(), 1);
        assert!(m.state().ended_at.is_some());
    }

    #[test]
    fn test_placeholder_statement_keeps_adherence() {
        let mut m = monitor();
        m.advance(DebateStage::Opening).unwrap();
        for _ in 0..3 {
            m.record_handover(Speaker::Proponent);
            let s = submit(&m, Speaker::Proponent, "[in favor opening statement unavailable: generation failed]")
                .degraded(true);
            assert!(m.review(&s).is_clean());
        }
        let state = m.state();
        assert!(state.interventions.is_empty());
        assert_eq!(state.topic_adherence, 1.0);
        assert!(state.adherence_history.is_empty());
        assert_eq!(state.statements_reviewed, 3);
    }

    #[tokio::test]
    async fn test_degraded_messages_use_fallback() {
        let mut m = ModeratorMonitor::new(TOPIC, Arc::new(MockProvider::failing(LlmError::RateLimited)));
        let action = m.introduce().await;
        assert!(action.degraded);
        assert!(action.content.contains(TOPIC));
        let report = m.close().await;
        assert_eq!(report.summary, DebateSummary::default());
    }

    #[test]
    fn test_summary_parse() {
        let s = DebateSummary::parse(
            "1. Main arguments:\n- Cost\n2. Key evidence:\n- 68% of teams\n3. Points of disagreement:\n- Mandates\n4. Areas of consensus:\n- Structure helps",
        );
        assert_eq!(s.key_points, vec!["Cost"]);
        assert_eq!(s.evidence, vec!["68% of teams"]);
        assert_eq!(s.disagreements, vec!["Mandates"]);
        assert_eq!(s.consensus, vec!["Structure helps"]);
        assert_eq!(DebateSummary::parse("nothing useful"), DebateSummary::default());
    }
}
