//! The perceive → decide → act → learn loop shared by all agents

use agora_llm::{GenerationOptions, LlmProvider, LlmRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Instant;
use uuid::Uuid;

use crate::agent::{Agent, AgentState, Emotion};
use crate::belief::Belief;
use crate::error::{AgentError, AgentResult};
use crate::memory::{Memory, MemoryKind};
use crate::personality::Trait;
use crate::text::{self, Sentiment};

/// Seconds over which recency decays to zero
pub const RECENCY_WINDOW_SECS: f64 = 300.0;
/// Emotional shift that makes an input memorable regardless of importance
pub const EMOTIONAL_SIGNIFICANCE: f64 = 0.3;
/// Overlap at which feedback reinforces an existing belief
pub const REINFORCE_OVERLAP: f64 = 0.5;

const STRICT_SUFFIX: &str = "Rewrite your answer using calm, respectful and neutral language. \
Avoid any hostile, offensive or inflammatory wording.";

/// Category of perceived input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Argument,
    Rebuttal,
    FactCheck,
    Moderation,
    Feedback,
    Instruction,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Argument => "argument",
            InputKind::Rebuttal => "rebuttal",
            InputKind::FactCheck => "fact_check",
            InputKind::Moderation => "moderation",
            InputKind::Feedback => "feedback",
            InputKind::Instruction => "instruction",
        }
    }
}

/// Something the agent hears
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    pub kind: InputKind,
    pub content: String,
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Input {
    pub fn new(kind: InputKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            source: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Structured features pulled out of an input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    pub key_terms: Vec<String>,
    pub sentiment: Sentiment,
    pub figures: usize,
}

/// Result of perceiving an input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perception {
    pub kind: InputKind,
    pub content: String,
    pub extracted: ExtractedInfo,
    pub emotion: Emotion,
    pub emotional_delta: f64,
    pub importance: f64,
    pub goal_relevance: f64,
    pub stored: Option<Uuid>,
}

/// One option offered to [`Agent::decide`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Creation order; earlier candidates win exact score ties
    pub sequence: u64,
    pub label: String,
    /// Instruction carried into the prompt if chosen
    pub directive: String,
    /// Traits whose strength favours this option
    pub traits: Vec<Trait>,
    pub evidence: Vec<String>,
}

impl Candidate {
    pub fn new(label: impl Into<String>, directive: impl Into<String>) -> Self {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);
        Self {
            sequence: SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed),
            label: label.into(),
            directive: directive.into(),
            traits: Vec::new(),
            evidence: Vec::new(),
        }
    }

    pub fn with_traits(mut self, traits: &[Trait]) -> Self {
        self.traits = traits.to_vec();
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }
}

/// What the agent is deciding about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionContext {
    /// Text the decision is about, matched against beliefs
    pub focus: String,
    /// Key/value context matched against memories
    pub attributes: BTreeMap<String, String>,
    pub candidates: Vec<Candidate>,
}

impl DecisionContext {
    pub fn new(focus: impl Into<String>) -> Self {
        Self {
            focus: focus.into(),
            ..Self::default()
        }
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn candidate(mut self, candidate: Candidate) -> Self {
        self.candidates.push(candidate);
        self
    }
}

/// The chosen option with its justification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub label: String,
    pub directive: String,
    pub confidence: f64,
    pub rationale: String,
    pub supporting_beliefs: Vec<Uuid>,
    pub supporting_memories: Vec<Uuid>,
}

/// A request to speak
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub prompt: String,
    /// Falls back to the agent's role
    pub system: Option<String>,
    /// Falls back to the personality mapping of the default options
    pub options: Option<GenerationOptions>,
    pub decision: Option<Decision>,
}

impl ActionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            options: None,
            decision: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }
}

/// Output of a successful action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub text: String,
    pub latency_ms: u64,
    /// True when the first generation was rejected by the content filter
    pub regenerated: bool,
}

/// Feedback delivered to [`Agent::learn`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub content: String,
    pub evidence: Vec<String>,
    pub source: Option<String>,
    /// How well things went, in [0, 1]; also the confidence of any new belief
    pub outcome: f64,
    pub trait_targets: Vec<(Trait, f64)>,
    pub goal_progress: f64,
}

impl Feedback {
    pub fn new(content: impl Into<String>, outcome: f64) -> Self {
        Self {
            content: content.into(),
            evidence: Vec::new(),
            source: None,
            outcome: if outcome.is_finite() { outcome.clamp(0.0, 1.0) } else { 0.0 },
            trait_targets: Vec::new(),
            goal_progress: 0.0,
        }
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn nudge(mut self, t: Trait, target: f64) -> Self {
        self.trait_targets.push((t, target));
        self
    }

    pub fn with_goal_progress(mut self, progress: f64) -> Self {
        self.goal_progress = progress;
        self
    }
}

/// What changed as a result of learning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningOutcome {
    pub new_belief: Option<Uuid>,
    pub contradicted: Vec<Uuid>,
    pub reinforced: Vec<Uuid>,
    pub trait_changes: Vec<(Trait, f64)>,
    pub goal_progress: Option<f64>,
}

fn emotion_rule(kind: InputKind, sentiment: Sentiment) -> Option<Emotion> {
    match (kind, sentiment) {
        (InputKind::Rebuttal | InputKind::Argument, Sentiment::Negative) => Some(Emotion::Defensive),
        (InputKind::Rebuttal | InputKind::Argument, _) => Some(Emotion::Engaged),
        (InputKind::FactCheck, _) => Some(Emotion::Analytical),
        (InputKind::Feedback, Sentiment::Positive) => Some(Emotion::Persuasive),
        (InputKind::Feedback, Sentiment::Negative) => Some(Emotion::Defensive),
        (InputKind::Feedback, Sentiment::Neutral) => None,
        (InputKind::Moderation, _) => Some(Emotion::Neutral),
        (InputKind::Instruction, _) => Some(Emotion::Engaged),
    }
}

impl Agent {
    /// Interpret an input, update emotion and working memory, and store it
    /// when important, emotionally significant, or relevant to a goal
    pub fn perceive(&mut self, input: Input) -> Perception {
        self.transition(AgentState::Listening);

        let terms = text::key_terms(&input.content);
        let (sentiment, magnitude) = text::sentiment(&input.content);
        let figures = input
            .content
            .split_whitespace()
            .filter(|w| w.chars().any(|c| c.is_ascii_digit()))
            .count();

        let age = (Utc::now() - input.timestamp).num_milliseconds().max(0) as f64 / 1000.0;
        let recency = 1.0 - (age / RECENCY_WINDOW_SECS).min(1.0);
        let novelty = 1.0
            - self
                .working_memory
                .recent_inputs
                .iter()
                .map(|prev| text::jaccard(&terms, &text::key_terms(prev)))
                .fold(0.0, f64::max);
        let goal_relevance = self
            .goals
            .iter()
            .map(|g| g.relevance(&terms))
            .fold(0.0, f64::max);
        let importance =
            (0.2 * recency + 0.45 * novelty + 0.35 * goal_relevance).clamp(0.0, 1.0);

        let previous = self.emotion;
        let emotion = emotion_rule(input.kind, sentiment).unwrap_or(previous);
        let emotional_delta = if emotion != previous {
            magnitude.max(EMOTIONAL_SIGNIFICANCE)
        } else {
            magnitude
        };
        self.emotion = emotion;

        let stored = if importance > self.config.memory_threshold
            || emotional_delta >= EMOTIONAL_SIGNIFICANCE
            || goal_relevance > 0.0
        {
            let kind = match input.kind {
                InputKind::FactCheck | InputKind::Feedback => MemoryKind::Semantic,
                _ => MemoryKind::Episodic,
            };
            let mut memory = Memory::new(input.content.clone(), importance, kind)
                .with_context("type", input.kind.as_str())
                .with_context("emotion", emotion.as_str());
            if let Some(source) = &input.source {
                memory = memory.with_context("source", source.clone());
            }
            let id = memory.id;
            self.memories.store(memory);
            Some(id)
        } else {
            None
        };

        let wm = &mut self.working_memory;
        wm.recent_inputs.push_back(input.content.clone());
        while wm.recent_inputs.len() > self.config.working_memory_size.max(1) {
            wm.recent_inputs.pop_front();
        }
        if let Some(focus) = terms.first() {
            wm.current_focus = Some(focus.clone());
        }
        self.refresh_active_goals();

        tracing::debug!(
            agent = %self.config.name,
            kind = input.kind.as_str(),
            importance,
            emotion = emotion.as_str(),
            stored = stored.is_some(),
            "Perceived input"
        );

        Perception {
            kind: input.kind,
            content: input.content,
            extracted: ExtractedInfo {
                key_terms: terms,
                sentiment,
                figures,
            },
            emotion,
            emotional_delta,
            importance,
            goal_relevance,
            stored,
        }
    }

    /// Score each candidate from supporting evidence and trait alignment and
    /// pick the best one
    pub fn decide(&mut self, context: DecisionContext) -> AgentResult<Decision> {
        self.transition(AgentState::Thinking);
        self.metrics.decisions_made += 1;

        let focus_terms = text::key_terms(&context.focus);
        let beliefs = self.beliefs.applicable(&focus_terms, 0.0);
        let memories = self
            .memories
            .recall(&context.attributes, self.config.similarity_threshold);

        let mut best: Option<(f64, usize, Candidate, Vec<Uuid>, Vec<Uuid>)> = None;
        for candidate in context.candidates.into_iter().take(self.config.max_options) {
            let mut cand_terms = text::key_terms(&format!("{} {}", candidate.label, candidate.directive));
            cand_terms.extend(focus_terms.iter().cloned());

            let supporting_beliefs: Vec<&Belief> = beliefs
                .iter()
                .copied()
                .filter(|b| text::coverage(&b.key_terms(), &cand_terms) > 0.0)
                .collect();
            let matched_memories: Vec<&Memory> = memories
                .iter()
                .copied()
                .filter(|m| text::coverage(&text::key_terms(&m.content), &cand_terms) > 0.0)
                .collect();

            let support = candidate.evidence.len() as f64
                + supporting_beliefs.iter().map(|b| b.confidence()).sum::<f64>()
                + matched_memories.iter().map(|m| m.importance).sum::<f64>();
            let evidence_strength = 1.0 - (-0.5 * support).exp();
            let alignment = self.personality.alignment(&candidate.traits);
            let score = 0.6 * evidence_strength + 0.4 * alignment;

            let evidence_count = candidate.evidence.len();
            let better = match &best {
                None => true,
                Some((best_score, best_evidence, best_cand, _, _)) => {
                    match score.total_cmp(best_score) {
                        Ordering::Greater => true,
                        Ordering::Less => false,
                        Ordering::Equal => (candidate.sequence, std::cmp::Reverse(evidence_count))
                            < (best_cand.sequence, std::cmp::Reverse(*best_evidence)),
                    }
                }
            };
            if better {
                let belief_ids = supporting_beliefs.iter().map(|b| b.id).collect();
                let memory_ids = matched_memories.iter().map(|m| m.id).collect();
                best = Some((score, evidence_count, candidate, belief_ids, memory_ids));
            }
        }

        let Some((score, _, candidate, supporting_beliefs, supporting_memories)) = best else {
            return Err(AgentError::NoApplicableOption);
        };
        if score < self.config.confidence_floor {
            tracing::debug!(agent = %self.config.name, score, "No option cleared the floor");
            return Err(AgentError::NoApplicableOption);
        }

        let rationale = format!(
            "Chose '{}' with score {:.2} from {} belief(s), {} memory(ies) and {} evidence item(s)",
            candidate.label,
            score,
            supporting_beliefs.len(),
            supporting_memories.len(),
            candidate.evidence.len()
        );
        tracing::debug!(agent = %self.config.name, choice = %candidate.label, score, "Decided");

        Ok(Decision {
            label: candidate.label,
            directive: candidate.directive,
            confidence: score,
            rationale,
            supporting_beliefs,
            supporting_memories,
        })
    }

    /// Generate a reply. Filtered output is regenerated once with stricter
    /// settings; a second violation is returned as
    /// [`AgentError::ContentViolation`].
    pub async fn act<L>(&mut self, llm: &L, request: ActionRequest) -> AgentResult<ActionOutcome>
    where
        L: LlmProvider + ?Sized,
    {
        self.transition(AgentState::Speaking);
        let start = Instant::now();

        let system = request.system.unwrap_or_else(|| self.config.role.clone());
        let options = request
            .options
            .unwrap_or_else(|| self.personality.generation_options(&GenerationOptions::default()));
        let prompt = match &request.decision {
            Some(decision) if !decision.directive.is_empty() => {
                format!("{}\nApproach: {}", request.prompt, decision.directive)
            }
            _ => request.prompt,
        };

        let result = self.generate_filtered(llm, &system, &prompt, options).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        self.transition(AgentState::Idle);

        match result {
            Ok((text, regenerated)) => {
                self.metrics.successful_actions += 1;
                self.metrics.total_latency_ms += latency_ms;
                let memory = Memory::new(text.clone(), 0.4, MemoryKind::Episodic)
                    .with_context("type", "own_statement")
                    .with_context("emotion", self.emotion.as_str());
                self.memories.store(memory);
                Ok(ActionOutcome {
                    text,
                    latency_ms,
                    regenerated,
                })
            }
            Err(err) => {
                self.metrics.failed_actions += 1;
                tracing::warn!(agent = %self.config.name, error = %err, "Action failed");
                Err(err)
            }
        }
    }

    async fn generate_filtered<L>(
        &self,
        llm: &L,
        system: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> AgentResult<(String, bool)>
    where
        L: LlmProvider + ?Sized,
    {
        metrics::counter!("agora_generation_attempts_total").increment(1);
        let first = llm
            .complete(LlmRequest::with_role(system, prompt).options(options))
            .await?;
        let violations = self.filter.violations(&first.content);
        if violations.is_empty() {
            return Ok((first.content, false));
        }

        tracing::warn!(
            agent = %self.config.name,
            terms = ?violations,
            "Output rejected by content filter, regenerating"
        );
        metrics::counter!("agora_content_regenerations_total").increment(1);
        metrics::counter!("agora_generation_attempts_total").increment(1);
        let strict_prompt = format!("{prompt}\n\n{STRICT_SUFFIX}");
        let second = llm
            .complete(LlmRequest::with_role(system, &strict_prompt).options(options.stricter()))
            .await?;
        let terms = self.filter.violations(&second.content);
        if terms.is_empty() {
            Ok((second.content, true))
        } else {
            Err(AgentError::ContentViolation {
                terms,
                text: second.content,
            })
        }
    }

    /// Fold feedback into beliefs, personality and goals. Does not change state.
    pub fn learn(&mut self, feedback: Feedback) -> LearningOutcome {
        self.metrics.learning_events += 1;
        let mut outcome = LearningOutcome::default();

        let contradicted = self.beliefs.conflicts(&feedback.content);
        let reinforced = if contradicted.is_empty() {
            self.beliefs.agreeing(&feedback.content, REINFORCE_OVERLAP)
        } else {
            Vec::new()
        };

        if reinforced.is_empty() && !feedback.content.trim().is_empty() {
            let mut belief = Belief::observed(feedback.content.clone(), feedback.outcome)
                .with_evidence(feedback.evidence.clone());
            if let Some(source) = &feedback.source {
                belief = belief.with_source(source.clone());
            }
            belief.contradictions = contradicted.clone();
            let new_id = belief.id;
            for id in &contradicted {
                self.beliefs.record_contradiction(*id, new_id);
            }
            outcome.new_belief = Some(self.beliefs.add(belief));
        }
        for id in &reinforced {
            self.beliefs.reinforce(*id, &feedback.evidence);
        }
        outcome.contradicted = contradicted;
        outcome.reinforced = reinforced;

        for (t, target) in &feedback.trait_targets {
            let value = self.personality.nudge(*t, *target);
            outcome.trait_changes.push((*t, value));
        }

        if feedback.goal_progress > 0.0 {
            let terms = text::key_terms(&feedback.content);
            let target = self
                .goals
                .iter_mut()
                .filter(|g| !g.is_achieved())
                .max_by(|a, b| {
                    a.relevance(&terms)
                        .total_cmp(&b.relevance(&terms))
                        .then(a.priority.total_cmp(&b.priority))
                });
            if let Some(goal) = target {
                outcome.goal_progress = Some(goal.advance(feedback.goal_progress));
            }
            self.refresh_active_goals();
        }

        tracing::debug!(
            agent = %self.config.name,
            new_belief = outcome.new_belief.is_some(),
            contradicted = outcome.contradicted.len(),
            reinforced = outcome.reinforced.len(),
            "Learned from feedback"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::goal::Goal;
    use crate::personality::Personality;
    use agora_llm::{LlmError, MockProvider};

    fn agent() -> Agent {
        Agent::new(AgentConfig::named("Pro", "Debater"), Personality::debater())
            .with_goal(Goal::new("Persuade the audience about remote work", 0.9))
    }

    #[test]
    fn test_perceive_stores_relevant_input() {
        let mut a = agent();
        let p = a.perceive(Input::new(InputKind::Argument, "Remote work improves focus").from_source("Con"));
        assert_eq!(a.state(), AgentState::Listening);
        assert!(p.goal_relevance > 0.0);
        assert!(p.stored.is_some());
        assert_eq!(p.emotion, Emotion::Engaged);
        assert_eq!(a.working_memory.current_focus.as_deref(), Some("remote"));
    }

    #[test]
    fn test_repeated_input_loses_novelty() {
        let mut a = agent();
        let first = a.perceive(Input::new(InputKind::Instruction, "Lunch menu options today"));
        let second = a.perceive(Input::new(InputKind::Instruction, "Lunch menu options today"));
        assert!(second.importance < first.importance);
    }

    #[test]
    fn test_fact_check_makes_agent_analytical() {
        let mut a = agent();
        let p = a.perceive(Input::new(InputKind::FactCheck, "Claim verified with 0.85 confidence"));
        assert_eq!(p.emotion, Emotion::Analytical);
        assert!(p.emotional_delta >= EMOTIONAL_SIGNIFICANCE);
    }

    #[test]
    fn test_decide_prefers_evidence_and_traits() {
        let mut a = agent();
        let ctx = DecisionContext::new("remote work")
            .candidate(Candidate::new("soft", "Concede gently").with_traits(&[Trait::Empathy]))
            .candidate(
                Candidate::new("evidence", "Lead with data")
                    .with_traits(&[Trait::Analytical])
                    .with_evidence(vec!["survey".into(), "study".into()]),
            );
        let d = a.decide(ctx).unwrap();
        assert_eq!(d.label, "evidence");
        assert_eq!(a.state(), AgentState::Thinking);
        assert_eq!(a.metrics.decisions_made, 1);
    }

    #[test]
    fn test_decide_tie_goes_to_earlier_candidate() {
        let mut a = agent();
        let ctx = DecisionContext::new("")
            .candidate(Candidate::new("first", "a"))
            .candidate(Candidate::new("second", "b"));
        assert_eq!(a.decide(ctx).unwrap().label, "first");
    }

    #[test]
    fn test_decide_respects_floor() {
        let mut a = agent();
        a.config.confidence_floor = 0.9;
        let ctx = DecisionContext::new("x").candidate(Candidate::new("weak", "a"));
        assert!(matches!(a.decide(ctx), Err(AgentError::NoApplicableOption)));
        assert!(matches!(
            a.decide(DecisionContext::new("x")),
            Err(AgentError::NoApplicableOption)
        ));
    }

    #[tokio::test]
    async fn test_act_returns_to_idle() {
        let mut a = agent();
        let llm = MockProvider::constant("Remote work widens the talent pool.");
        let out = a.act(&llm, ActionRequest::new("Say something")).await.unwrap();
        assert!(!out.regenerated);
        assert_eq!(a.state(), AgentState::Idle);
        assert_eq!(a.metrics.successful_actions, 1);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_act_regenerates_once() {
        let mut a = agent();
        let llm = MockProvider::new(vec![
            "That is a hateful idea".to_string(),
            "That idea has costs".to_string(),
        ]);
        let out = a.act(&llm, ActionRequest::new("Respond")).await.unwrap();
        assert!(out.regenerated);
        assert_eq!(out.text, "That idea has costs");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_act_reports_persistent_violation() {
        let mut a = agent();
        let llm = MockProvider::constant("violent words");
        let err = a.act(&llm, ActionRequest::new("Respond")).await.unwrap_err();
        match err {
            AgentError::ContentViolation { terms, .. } => assert_eq!(terms, vec!["violent"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(llm.calls(), 2);
        assert_eq!(a.metrics.failed_actions, 1);
        assert_eq!(a.state(), AgentState::Idle);
    }

    #[tokio::test]
    async fn test_act_propagates_generation_error() {
        let mut a = agent();
        let llm = MockProvider::failing(LlmError::NotAvailable);
        let err = a.act(&llm, ActionRequest::new("Respond")).await.unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
    }

    #[test]
    fn test_learn_records_contradiction() {
        let mut a = agent();
        let first = a.learn(Feedback::new("Remote work improves productivity", 0.9));
        let original = first.new_belief.unwrap();
        let state_before = a.state();

        let second = a.learn(Feedback::new("Remote work does not improve productivity", 0.6));
        assert_eq!(second.contradicted, vec![original]);
        let belief = a.beliefs.get(original).unwrap();
        assert!((belief.confidence() - 0.72).abs() < 1e-9);
        assert_eq!(belief.contradictions, vec![second.new_belief.unwrap()]);
        assert_eq!(a.state(), state_before);
    }

    #[test]
    fn test_learn_reinforces_and_nudges() {
        let mut a = agent();
        a.learn(Feedback::new("Remote work improves productivity", 0.5));
        let before = a.personality.get(Trait::Analytical);
        let out = a.learn(
            Feedback::new("Remote work improves productivity a lot", 0.8)
                .with_evidence(vec!["Stanford study".into()])
                .nudge(Trait::Analytical, 1.0)
                .with_goal_progress(0.3),
        );
        assert_eq!(out.reinforced.len(), 1);
        assert!(out.new_belief.is_none());
        assert!((a.personality.get(Trait::Analytical) - (before + 0.05)).abs() < 1e-9);
        assert_eq!(out.goal_progress, Some(0.3));
    }
}
