//! Debate orchestrator - sequences stages and turns across the three roles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agora_agents::{
    ArgumentKind, DebateAgent, DebateAnalytics, DebateStage, DebateState, DebateSummary,
    FactVerifier, GeneratedArgument, ModeratorAction, ModeratorMonitor, Speaker, Stance,
    StatementReport, Submission, VerificationStatus, VerifierStats,
};
use agora_core::{Feedback, Trait};
use agora_llm::LlmProvider;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::DebateConfig;
use crate::error::DebateError;
use crate::log::{DebateLog, EntryKind};

/// Cooperative cancellation flag, checked at every turn boundary
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a session produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub log: DebateLog,
    pub analytics: DebateAnalytics,
    /// Present when the moderator reached the closing stage
    pub summary: Option<DebateSummary>,
    pub state: DebateState,
    /// Stages entered, in order
    pub stages: Vec<DebateStage>,
    pub verifier: VerifierStats,
    /// False when the session was stopped early
    pub completed: bool,
}

/// Runs one debate session
#[derive(Debug)]
pub struct DebateOrchestrator<L: LlmProvider> {
    config: DebateConfig,
    proponent: DebateAgent<L>,
    opponent: DebateAgent<L>,
    verifier: FactVerifier<L>,
    moderator: ModeratorMonitor<L>,
    log: DebateLog,
    stop: StopHandle,
}

impl<L: LlmProvider> DebateOrchestrator<L> {
    /// Validates the configuration before any agent is built
    pub fn new(config: DebateConfig, llm: Arc<L>) -> Result<Self, DebateError> {
        config.validate()?;
        Ok(Self {
            proponent: DebateAgent::new("Proponent", Stance::InFavor, config.style, llm.clone()),
            opponent: DebateAgent::new("Opponent", Stance::Against, config.style, llm.clone()),
            verifier: FactVerifier::new(llm.clone()),
            moderator: ModeratorMonitor::new(&config.topic, llm),
            config,
            log: DebateLog::new(),
            stop: StopHandle::new(),
        })
    }

    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn log(&self) -> &DebateLog {
        &self.log
    }

    pub fn state(&self) -> &DebateState {
        self.moderator.state()
    }

    /// Run the full sequence: introduction, openings, rebuttal rounds,
    /// closings, moderator closing and analytics
    pub async fn run(mut self) -> Result<DebateOutcome, DebateError> {
        tracing::info!(
            topic = %self.config.topic,
            style = ?self.config.style,
            rounds = self.config.rounds,
            fact_checking = self.config.fact_checking,
            "Debate starting"
        );

        if self.stopped() {
            return Ok(self.finish(None, false));
        }
        let intro = self.moderator.introduce().await;
        self.log_moderator(EntryKind::Introduction, &intro);

        self.moderator.advance(DebateStage::Opening)?;
        let Some(pro_opening) = self.turn(Speaker::Proponent, ArgumentKind::Opening, None).await else {
            return Ok(self.finish(None, false));
        };
        let Some(con_opening) = self.turn(Speaker::Opponent, ArgumentKind::Opening, None).await else {
            return Ok(self.finish(None, false));
        };
        self.fact_check_pair(&pro_opening, &con_opening).await;

        let mut last_con = con_opening;
        for round in 1..=self.config.rounds {
            self.moderator.advance(DebateStage::Round(round))?;
            let Some(pro) = self
                .turn(Speaker::Proponent, ArgumentKind::Rebuttal, Some(last_con.as_str()))
                .await
            else {
                return Ok(self.finish(None, false));
            };
            let Some(con) = self.turn(Speaker::Opponent, ArgumentKind::Rebuttal, Some(pro.as_str())).await else {
                return Ok(self.finish(None, false));
            };
            self.fact_check_pair(&pro, &con).await;

            let state = self.moderator.state();
            tracing::info!(
                round,
                topic_adherence = state.topic_adherence,
                interventions = state.interventions.len(),
                "Round complete"
            );
            last_con = con;
        }

        self.moderator.advance(DebateStage::Closing)?;
        if self.turn(Speaker::Proponent, ArgumentKind::Closing, None).await.is_none()
            || self.turn(Speaker::Opponent, ArgumentKind::Closing, None).await.is_none()
        {
            return Ok(self.finish(None, false));
        }

        let closing = self.moderator.close().await;
        self.log.append(
            DebateStage::Closing,
            Speaker::Moderator,
            EntryKind::ModeratorClosing,
            closing.action.content.clone(),
            json!({ "summary": closing.summary, "degraded": closing.action.degraded }),
        );
        self.log.append(
            DebateStage::Closing,
            Speaker::Moderator,
            EntryKind::Analytics,
            format!(
                "Speaker balance {:.2}, topic adherence {:.2}, {} intervention(s)",
                closing.analytics.speaker_balance,
                closing.analytics.topic_adherence,
                closing.analytics.total_interventions
            ),
            serde_json::to_value(&closing.analytics).unwrap_or_default(),
        );
        tracing::info!(entries = self.log.len(), "Debate complete");
        Ok(self.finish(Some(closing.summary), true))
    }

    fn stopped(&self) -> bool {
        let stopped = self.stop.is_stopped();
        if stopped {
            tracing::info!(stage = %self.moderator.stage(), "Stop requested, ending at turn boundary");
        }
        stopped
    }

    fn finish(self, summary: Option<DebateSummary>, completed: bool) -> DebateOutcome {
        DebateOutcome {
            analytics: self.moderator.analytics(),
            state: self.moderator.state().clone(),
            stages: self.moderator.machine().history().to_vec(),
            verifier: self.verifier.stats(),
            log: self.log,
            summary,
            completed,
        }
    }

    /// One debater turn; `None` when a stop was requested
    async fn turn(&mut self, speaker: Speaker, kind: ArgumentKind, prior: Option<&str>) -> Option<String> {
        if self.stopped() {
            return None;
        }
        self.hand_over(speaker).await;

        let generated = self.generate(speaker, kind, prior).await;
        let stage = self.moderator.stage();
        let content = generated.content().to_string();

        if self.config.show_thinking {
            if let Some(decision) = &generated.decision {
                self.log.append(
                    stage,
                    speaker,
                    EntryKind::Thinking,
                    format!(
                        "Approach '{}' (confidence {:.2}): {}",
                        decision.label, decision.confidence, decision.rationale
                    ),
                    serde_json::to_value(decision).unwrap_or_default(),
                );
            }
        }
        self.log.append(stage, speaker, Self::entry_kind(kind), content.clone(), statement_metadata(&generated));

        match speaker {
            Speaker::Opponent => self.proponent.hear(&content),
            _ => self.opponent.hear(&content),
        }

        if generated.metadata.degraded {
            tracing::warn!(%speaker, %stage, "Reviewing placeholder statement; adherence unchanged");
        }
        let submission = Submission::new(speaker, stage, &content, self.moderator.policy())
            .degraded(generated.metadata.degraded);
        let report = self.moderator.review(&submission);
        if !report.is_clean() {
            if let Some(action) = self.moderator.intervene().await {
                let record = self.moderator.state().interventions.last().cloned();
                self.log.append(
                    stage,
                    Speaker::Moderator,
                    EntryKind::Intervention,
                    action.content,
                    json!({ "intervention": record, "report": report, "degraded": action.degraded }),
                );
            }
        }
        metrics::counter!("agora_debate_turns_total").increment(1);
        Some(content)
    }

    async fn generate(&mut self, speaker: Speaker, kind: ArgumentKind, prior: Option<&str>) -> GeneratedArgument {
        let params = self.config.parameters();
        let topic = &self.config.topic;
        let debater = match speaker {
            Speaker::Opponent => &mut self.opponent,
            _ => &mut self.proponent,
        };
        match kind {
            ArgumentKind::Opening => debater.opening_statement(topic, &params).await,
            ArgumentKind::Rebuttal => debater.rebuttal(topic, prior.unwrap_or_default(), &params).await,
            ArgumentKind::Closing => debater.closing_statement(topic, &params).await,
        }
    }

    /// Hand the floor to `speaker`, announcing it unless they already hold it
    async fn hand_over(&mut self, speaker: Speaker) {
        if self.moderator.state().current_speaker == Some(speaker) {
            self.moderator.record_handover(speaker);
            return;
        }
        let action = self.moderator.transition(speaker).await;
        self.log_moderator(EntryKind::Transition, &action);
    }

    /// Check both statements of a phase concurrently and wait for both
    async fn fact_check_pair(&mut self, pro: &str, con: &str) {
        if !self.config.fact_checking {
            return;
        }
        let (pro_report, con_report) = futures::join!(
            self.verifier.check_statement(pro),
            self.verifier.check_statement(con)
        );
        for (subject, report) in [(Speaker::Proponent, pro_report), (Speaker::Opponent, con_report)] {
            self.log.append(
                self.moderator.stage(),
                Speaker::FactChecker,
                EntryKind::FactCheck,
                format!(
                    "{subject}: {} with {:.2} confidence ({} accuracy, {} claim(s))",
                    report.status.as_str(),
                    report.confidence,
                    report.accuracy.as_str(),
                    report.claims.len()
                ),
                json!({ "subject": subject, "report": report }),
            );
            self.apply_fact_check(subject, &report);
        }
    }

    /// Feed verified and refuted claims back to the debater who made them
    fn apply_fact_check(&mut self, subject: Speaker, report: &StatementReport) {
        let debater = match subject {
            Speaker::Opponent => &mut self.opponent,
            _ => &mut self.proponent,
        };
        for claim in report.claims.iter().filter(|c| c.error.is_none()) {
            let feedback = Feedback::new(claim.claim.clone(), claim.evidence_likelihood)
                .with_evidence(claim.evidence.clone())
                .from_source("fact_checker");
            let feedback = match claim.status {
                VerificationStatus::Verified => feedback
                    .nudge(Trait::Assertiveness, 1.0)
                    .with_goal_progress(0.05),
                VerificationStatus::Refuted => feedback.nudge(Trait::Analytical, 1.0),
                VerificationStatus::Uncertain => feedback,
            };
            debater.receive_feedback(feedback);
        }
    }

    fn log_moderator(&mut self, kind: EntryKind, action: &ModeratorAction) {
        self.log.append(
            action.stage,
            Speaker::Moderator,
            kind,
            action.content.clone(),
            json!({ "degraded": action.degraded }),
        );
    }

    fn entry_kind(kind: ArgumentKind) -> EntryKind {
        match kind {
            ArgumentKind::Opening => EntryKind::Opening,
            ArgumentKind::Rebuttal => EntryKind::Rebuttal,
            ArgumentKind::Closing => EntryKind::Closing,
        }
    }
}

fn statement_metadata(generated: &GeneratedArgument) -> serde_json::Value {
    let argument = &generated.argument;
    json!({
        "strength": argument.strength,
        "claims": argument.claims,
        "evidence": argument.evidence,
        "counter_points": argument.counter_points,
        "argument": generated.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_llm::MockProvider;

    #[test]
    fn test_invalid_config_rejected_before_start() {
        let config = DebateConfig::new("Homework should be banned").with_rounds(7);
        let result = DebateOrchestrator::new(config, Arc::new(MockProvider::smart()));
        assert!(matches!(result, Err(DebateError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stop_before_start_returns_empty_log() {
        let llm = Arc::new(MockProvider::smart());
        let orchestrator = DebateOrchestrator::new(DebateConfig::new("Homework should be banned"), llm.clone()).unwrap();
        orchestrator.stop_handle().stop();
        let outcome = orchestrator.run().await.unwrap();
        assert!(!outcome.completed);
        assert!(outcome.log.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_fact_checking_disabled() {
        let config = DebateConfig::new("Homework should be banned")
            .with_rounds(1)
            .with_fact_checking(false);
        let outcome = DebateOrchestrator::new(config, Arc::new(MockProvider::smart()))
            .unwrap()
            .run()
            .await
            .unwrap();
        assert!(outcome.completed);
        assert_eq!(outcome.log.count(EntryKind::FactCheck), 0);
        assert_eq!(outcome.verifier, VerifierStats::default());
    }

    #[tokio::test]
    async fn test_show_thinking_logs_decisions() {
        let config = DebateConfig::new("Homework should be banned")
            .with_rounds(1)
            .with_show_thinking(true);
        let outcome = DebateOrchestrator::new(config, Arc::new(MockProvider::smart()))
            .unwrap()
            .run()
            .await
            .unwrap();
        let statements = outcome.log.statements().count();
        assert_eq!(statements, 6);
        assert!(outcome.log.count(EntryKind::Thinking) > 0);
        assert!(outcome.log.count(EntryKind::Thinking) <= statements);
    }
}
