//! Debate agents that argue one side of a motion

use agora_core::{
    ActionRequest, Agent, AgentConfig, AgentError, Candidate, Decision, DecisionContext, Feedback,
    Goal, Input, InputKind, LearningOutcome, Personality, Trait,
};
use agora_llm::LlmProvider;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::argument::{Argument, ArgumentKind, ArgumentMetadata, GeneratedArgument};
use crate::extraction::{self, Analysis};

/// Side of the motion a debater argues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    InFavor,
    Against,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::InFavor => "in favor of",
            Stance::Against => "against",
        }
    }

    pub fn opposite(&self) -> Stance {
        match self {
            Stance::InFavor => Stance::Against,
            Stance::Against => Stance::InFavor,
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stance::InFavor => "in favor",
            Stance::Against => "against",
        })
    }
}

/// Register the debaters speak in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStyle {
    #[default]
    Formal,
    Casual,
    Academic,
}

impl DebateStyle {
    pub fn guide(&self) -> &'static str {
        match self {
            DebateStyle::Formal => "Use precise language and academic tone",
            DebateStyle::Casual => "Use conversational language while maintaining respect",
            DebateStyle::Academic => "Use scholarly language with references to research",
        }
    }
}

impl std::str::FromStr for DebateStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formal" => Ok(DebateStyle::Formal),
            "casual" => Ok(DebateStyle::Casual),
            "academic" => Ok(DebateStyle::Academic),
            other => Err(format!("unknown debate style '{other}'")),
        }
    }
}

/// Per-turn budget handed to a debater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateParameters {
    pub points_per_argument: u8,
    pub time_limit_secs: u32,
}

impl Default for DebateParameters {
    fn default() -> Self {
        Self {
            points_per_argument: 3,
            time_limit_secs: 180,
        }
    }
}

/// An agent arguing one side of the motion
#[derive(Debug)]
pub struct DebateAgent<L: LlmProvider> {
    pub agent: Agent,
    pub stance: Stance,
    pub style: DebateStyle,
    llm: Arc<L>,
    arguments: Vec<Argument>,
    opponent_arguments: Vec<String>,
}

impl<L: LlmProvider> DebateAgent<L> {
    pub fn new(name: &str, stance: Stance, style: DebateStyle, llm: Arc<L>) -> Self {
        let config = AgentConfig::named(
            name,
            format!(
                "You are a thoughtful debater arguing {} the motion. {}.",
                stance.as_str(),
                style.guide()
            ),
        );
        let agent = Agent::new(config, Personality::debater())
            .with_goal(Goal::new("Present compelling arguments for the assigned position", 0.9))
            .with_goal(Goal::new("Counter the opposing arguments with evidence", 0.8));
        Self {
            agent,
            stance,
            style,
            llm,
            arguments: Vec::new(),
            opponent_arguments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn opponent_arguments(&self) -> &[String] {
        &self.opponent_arguments
    }

    /// Stance consistency across the arguments made so far
    pub fn stance_consistency(&self) -> f64 {
        let positions: Vec<f64> = self.arguments.iter().map(|a| a.position).collect();
        extraction::consistency(&positions)
    }

    pub async fn opening_statement(&mut self, topic: &str, params: &DebateParameters) -> GeneratedArgument {
        let prompt = format!(
            "Present an opening statement {stance} the motion.\n\
             Topic: {topic}\n\
             Present your perspective {stance} the motion in a way that:\n\
             - {guide}\n\
             - Makes {points} clear points\n\
             - Backs claims with specific examples or evidence\n\
             - Fits within {limit} seconds of speaking time\n\
             Avoid debate competition language and do not address judges or an audience.",
            stance = self.stance.as_str(),
            guide = self.style.guide(),
            points = params.points_per_argument,
            limit = params.time_limit_secs,
        );
        let context = DecisionContext::new(topic)
            .attribute("stage", "opening")
            .candidate(
                Candidate::new("evidence-led", "Lead with concrete figures and cited studies")
                    .with_traits(&[Trait::Analytical]),
            )
            .candidate(
                Candidate::new("values-led", "Frame the motion around the people it affects")
                    .with_traits(&[Trait::Empathy]),
            )
            .candidate(
                Candidate::new("assertive", "State the position firmly and preview each point")
                    .with_traits(&[Trait::Assertiveness]),
            );
        self.speak(ArgumentKind::Opening, prompt, context, Vec::new()).await
    }

    pub async fn rebuttal(
        &mut self,
        topic: &str,
        opponent_argument: &str,
        params: &DebateParameters,
    ) -> GeneratedArgument {
        self.hear(opponent_argument);
        let analysis = extraction::analyze(opponent_argument);
        let addressed: Vec<String> = analysis
            .counter_points
            .iter()
            .take(params.points_per_argument.max(1) as usize)
            .cloned()
            .collect();
        let points = if addressed.is_empty() {
            analysis
                .claims
                .iter()
                .take(params.points_per_argument.max(1) as usize)
                .map(|c| format!("Respond to: \"{c}\""))
                .collect::<Vec<_>>()
        } else {
            addressed.clone()
        };

        let prompt = format!(
            "Write a rebuttal {stance} the motion.\n\
             Topic: {topic}\n\
             Previous argument:\n{opponent_argument}\n\n\
             Address these points, most important first:\n{points}\n\n\
             Continue the discussion {stance} the motion in a way that:\n\
             - {guide}\n\
             - Presents counter-evidence or alternative perspectives\n\
             - Fits within {limit} seconds of speaking time\n\
             Address the arguments directly without debate formalities.",
            stance = self.stance.as_str(),
            points = points
                .iter()
                .map(|p| format!("- {p}"))
                .collect::<Vec<_>>()
                .join("\n"),
            guide = self.style.guide(),
            limit = params.time_limit_secs,
        );

        let excerpts: Vec<String> = analysis.weaknesses.iter().map(|w| w.excerpt.clone()).collect();
        let context = DecisionContext::new(opponent_argument)
            .attribute("stage", "rebuttal")
            .candidate(
                Candidate::new("counter-evidence", "Answer their figures with stronger evidence")
                    .with_traits(&[Trait::Analytical])
                    .with_evidence(analysis.evidence.clone()),
            )
            .candidate(
                Candidate::new("expose-weaknesses", "Take apart the weakest claims one by one")
                    .with_traits(&[Trait::Assertiveness, Trait::Analytical])
                    .with_evidence(excerpts),
            )
            .candidate(
                Candidate::new("reframe", "Reframe the question around overlooked trade-offs")
                    .with_traits(&[Trait::Openness]),
            );

        let mut generated = self.speak(ArgumentKind::Rebuttal, prompt, context, points).await;
        generated.metadata.addressed_points = addressed;
        generated
    }

    pub async fn closing_statement(&mut self, topic: &str, params: &DebateParameters) -> GeneratedArgument {
        let key_points = self.strongest_points(params.points_per_argument.max(1) as usize);
        let history = if key_points.is_empty() {
            "- (no earlier points)".to_string()
        } else {
            key_points
                .iter()
                .map(|p| format!("- {p}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let prompt = format!(
            "Write a closing statement {stance} the motion.\n\
             Topic: {topic}\n\
             Previous points discussed:\n{history}\n\n\
             Conclude your perspective in a way that:\n\
             - {guide}\n\
             - Synthesizes the main arguments presented\n\
             - Reinforces your key evidence and examples\n\
             - Addresses significant counterpoints raised\n\
             - Fits within {limit} seconds of speaking time\n\
             Do not address judges or an audience.",
            stance = self.stance.as_str(),
            guide = self.style.guide(),
            limit = params.time_limit_secs,
        );
        let context = DecisionContext::new(topic)
            .attribute("stage", "closing")
            .candidate(
                Candidate::new("reinforce", "Restate the strongest evidence-backed points")
                    .with_traits(&[Trait::Analytical, Trait::Assertiveness])
                    .with_evidence(key_points.clone()),
            )
            .candidate(
                Candidate::new("common-ground", "Acknowledge shared concerns before concluding")
                    .with_traits(&[Trait::Empathy, Trait::Openness]),
            );
        self.speak(ArgumentKind::Closing, prompt, context, Vec::new()).await
    }

    /// Register an opponent statement
    pub fn hear(&mut self, statement: &str) {
        if self.opponent_arguments.last().map(String::as_str) == Some(statement) {
            return;
        }
        self.opponent_arguments.push(statement.to_string());
        let kind = if self.opponent_arguments.len() == 1 {
            InputKind::Argument
        } else {
            InputKind::Rebuttal
        };
        self.agent.perceive(Input::new(kind, statement).from_source("opponent"));
        self.agent.settle();
    }

    /// Fold external feedback (e.g. fact checks) into beliefs and traits
    pub fn receive_feedback(&mut self, feedback: Feedback) -> LearningOutcome {
        self.agent.learn(feedback)
    }

    /// Claims from earlier arguments, strongest arguments first, deduplicated
    fn strongest_points(&self, limit: usize) -> Vec<String> {
        let mut ranked: Vec<&Argument> = self.arguments.iter().collect();
        ranked.sort_by(|a, b| b.strength.total_cmp(&a.strength));
        let mut points: Vec<String> = Vec::new();
        for argument in ranked {
            for claim in argument.evidence.iter().chain(argument.claims.iter()) {
                if !points.contains(claim) {
                    points.push(claim.clone());
                }
            }
        }
        points.truncate(limit.max(1) * 2);
        points
    }

    async fn speak(
        &mut self,
        kind: ArgumentKind,
        prompt: String,
        context: DecisionContext,
        addressed: Vec<String>,
    ) -> GeneratedArgument {
        let decision: Option<Decision> = match self.agent.decide(context) {
            Ok(decision) => Some(decision),
            Err(AgentError::NoApplicableOption) => None,
            Err(err) => {
                tracing::warn!(agent = %self.name(), error = %err, "Decision failed");
                None
            }
        };
        let mut request = ActionRequest::new(prompt);
        if let Some(d) = &decision {
            request = request.decision(d.clone());
        }

        let mut metadata = ArgumentMetadata {
            addressed_points: addressed,
            ..ArgumentMetadata::default()
        };
        let content = match self.agent.act(self.llm.as_ref(), request).await {
            Ok(outcome) => {
                metadata.regenerated = outcome.regenerated;
                metadata.latency_ms = outcome.latency_ms;
                outcome.text.trim().to_string()
            }
            Err(AgentError::ContentViolation { terms, text }) => {
                tracing::warn!(agent = %self.name(), ?terms, "Argument still violates content rules");
                metadata.regenerated = true;
                metadata.content_violation = Some(terms);
                text.trim().to_string()
            }
            Err(err) => {
                tracing::warn!(agent = %self.name(), kind = kind.as_str(), error = %err, "Generation degraded");
                metadata.degraded = true;
                metadata.error = Some(err.to_string());
                format!(
                    "[{} {} statement unavailable: generation failed]",
                    self.stance,
                    kind.as_str()
                )
            }
        };

        let argument = self.score(kind, content, &mut metadata);
        if !metadata.degraded {
            let progress = if metadata.low_evidence { 0.05 } else { 0.2 };
            for goal in self.agent.goals.iter_mut().take(1) {
                goal.advance(progress);
            }
        }
        tracing::info!(
            agent = %self.name(),
            kind = kind.as_str(),
            strength = argument.strength,
            confidence = metadata.confidence,
            degraded = metadata.degraded,
            "Argument generated"
        );

        self.arguments.push(argument.clone());
        GeneratedArgument {
            argument,
            metadata,
            decision,
        }
    }

    fn score(&self, kind: ArgumentKind, content: String, metadata: &mut ArgumentMetadata) -> Argument {
        let analysis: Analysis = if metadata.degraded {
            Analysis::default()
        } else {
            extraction::analyze(&content)
        };
        let low_evidence = analysis.low_evidence();
        let strength = extraction::strength(
            analysis.evidence.len(),
            analysis.specificity,
            analysis.word_count,
            low_evidence,
        );
        let position = extraction::stance_position(&content, self.stance == Stance::InFavor);

        let mut positions: Vec<f64> = self.arguments.iter().map(|a| a.position).collect();
        if !metadata.degraded {
            positions.push(position);
        }
        let consistency = extraction::consistency(&positions);

        metadata.low_evidence = low_evidence;
        metadata.stance_consistency = consistency;
        metadata.confidence = (0.6 * strength + 0.4 * consistency).clamp(0.0, 1.0);
        metadata.word_count = analysis.word_count;

        Argument {
            id: Uuid::new_v4(),
            kind,
            content,
            strength,
            claims: analysis.claims,
            evidence: analysis.evidence,
            weaknesses: analysis.weaknesses,
            counter_points: analysis.counter_points,
            position,
            created_at: Utc::now(),
        }
    }
}
