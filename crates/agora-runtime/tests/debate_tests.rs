//! End-to-end debate sessions against the prompt-aware mock provider

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agora_agents::{DebateStage, DebateStyle, Speaker};
use agora_llm::{LlmError, LlmProvider, LlmRequest, LlmResponse, MockProvider};
use agora_runtime::{DebateConfig, DebateError, DebateOrchestrator, EntryKind, StopHandle};
use async_trait::async_trait;
use proptest::prelude::*;

const TOPIC: &str = "Remote work should be mandatory";

/// Requests a stop once a given number of generations have started
#[derive(Debug)]
struct StoppingProvider {
    inner: MockProvider,
    stop: StopHandle,
    stop_at: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for StoppingProvider {
    fn name(&self) -> &str {
        "stopping"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.stop_at {
            self.stop.stop();
        }
        self.inner.complete(request).await
    }
}

/// Proponent openings carry a disallowed term, even on the stricter retry
#[derive(Debug)]
struct HostileOpeningProvider {
    inner: MockProvider,
}

#[async_trait]
impl LlmProvider for HostileOpeningProvider {
    fn name(&self) -> &str {
        "hostile-opening"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let first_line = request.prompt.lines().next().unwrap_or_default().to_lowercase();
        let hostile = first_line.contains("opening statement") && first_line.contains("in favor");
        let mut response = self.inner.complete(request).await?;
        if hostile {
            response.content.push_str(" Critics of this plan are offensive to working parents.");
        }
        Ok(response)
    }
}

async fn run(config: DebateConfig) -> agora_runtime::DebateOutcome {
    DebateOrchestrator::new(config, Arc::new(MockProvider::smart()))
        .unwrap()
        .run()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_remote_work_debate() {
    let config = DebateConfig::new(TOPIC).with_rounds(2).with_style(DebateStyle::Formal);
    let outcome = run(config).await;
    let log = &outcome.log;

    assert!(outcome.completed);
    assert_eq!(log.count(EntryKind::Introduction), 1);
    assert_eq!(log.count(EntryKind::Opening), 2);
    assert_eq!(log.count(EntryKind::Rebuttal), 4);
    assert!(log.count(EntryKind::FactCheck) >= 4);
    assert_eq!(log.count(EntryKind::Closing), 2);
    assert_eq!(log.count(EntryKind::ModeratorClosing), 1);
    assert_eq!(log.count(EntryKind::Analytics), 1);
    assert_eq!(log.last().map(|e| e.kind), Some(EntryKind::Analytics));

    let analytics = &outcome.analytics;
    assert_eq!(
        analytics.intervention_counts.values().sum::<usize>(),
        analytics.total_interventions
    );
    assert_eq!(analytics.total_interventions, log.count(EntryKind::Intervention));
    assert_eq!(analytics.topic_adherence_trend.len(), 8);
    assert!((0.0..=1.0).contains(&analytics.speaker_balance));
    assert!(outcome.summary.is_some_and(|s| !s.key_points.is_empty()));
    assert_eq!(outcome.state.stage, DebateStage::Closing);
}

#[tokio::test]
async fn test_stages_never_move_backward_and_speakers_alternate() {
    let outcome = run(DebateConfig::new(TOPIC).with_rounds(3)).await;
    let stages: Vec<DebateStage> = outcome.log.iter().map(|e| e.stage).collect();
    assert!(stages.windows(2).all(|w| w[0] <= w[1]), "{stages:?}");
    assert_eq!(
        outcome.stages,
        vec![
            DebateStage::Introduction,
            DebateStage::Opening,
            DebateStage::Round(1),
            DebateStage::Round(2),
            DebateStage::Round(3),
            DebateStage::Closing,
        ]
    );

    let speakers: Vec<Speaker> = outcome.log.statements().map(|e| e.speaker).collect();
    assert_eq!(speakers.len(), 10);
    for (i, speaker) in speakers.iter().enumerate() {
        let expected = if i % 2 == 0 { Speaker::Proponent } else { Speaker::Opponent };
        assert_eq!(*speaker, expected);
    }

    let sequences: Vec<usize> = outcome.log.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, (0..outcome.log.len()).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_fact_checks_follow_each_phase() {
    let outcome = run(DebateConfig::new(TOPIC).with_rounds(1)).await;
    let kinds: Vec<EntryKind> = outcome
        .log
        .iter()
        .map(|e| e.kind)
        .filter(|k| k.is_statement() || *k == EntryKind::FactCheck)
        .collect();
    assert_eq!(
        kinds,
        vec![
            EntryKind::Opening,
            EntryKind::Opening,
            EntryKind::FactCheck,
            EntryKind::FactCheck,
            EntryKind::Rebuttal,
            EntryKind::Rebuttal,
            EntryKind::FactCheck,
            EntryKind::FactCheck,
            EntryKind::Closing,
            EntryKind::Closing,
        ]
    );
    assert!(outcome.verifier.cache_misses > 0);
}

#[tokio::test]
async fn test_stop_takes_effect_at_turn_boundary() {
    let stop = StopHandle::new();
    // introduction, first hand-over, then the proponent's opening
    let llm = Arc::new(StoppingProvider {
        inner: MockProvider::smart(),
        stop: stop.clone(),
        stop_at: 3,
        calls: AtomicUsize::new(0),
    });
    let outcome = DebateOrchestrator::new(DebateConfig::new(TOPIC), llm)
        .unwrap()
        .with_stop_handle(stop)
        .run()
        .await
        .unwrap();

    assert!(!outcome.completed);
    assert_eq!(outcome.log.count(EntryKind::Opening), 1);
    assert_eq!(outcome.log.count(EntryKind::Analytics), 0);
    let last = outcome.log.last().unwrap();
    assert_eq!(last.kind, EntryKind::Opening);
    assert_eq!(last.metadata["argument"]["degraded"], false);
}

#[tokio::test]
async fn test_failing_provider_degrades_without_aborting() {
    let config = DebateConfig::new(TOPIC).with_rounds(1);
    let outcome = DebateOrchestrator::new(config, Arc::new(MockProvider::failing(LlmError::NotAvailable)))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.log.statements().count(), 6);
    assert!(outcome
        .log
        .statements()
        .all(|e| e.metadata["argument"]["degraded"] == true));
    assert_eq!(outcome.analytics.total_interventions, 0);
    assert_eq!(outcome.log.count(EntryKind::Intervention), 0);
    assert!(outcome.analytics.topic_adherence_trend.is_empty());
    assert_eq!(outcome.analytics.topic_adherence, 1.0);
}

#[tokio::test]
async fn test_inappropriate_opening_draws_one_intervention() {
    let llm = Arc::new(HostileOpeningProvider {
        inner: MockProvider::smart(),
    });
    let outcome = DebateOrchestrator::new(DebateConfig::new(TOPIC).with_rounds(1), llm)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert!(outcome.completed);

    let entries = outcome.log.entries();
    let opening = entries
        .iter()
        .position(|e| e.kind == EntryKind::Opening && e.speaker == Speaker::Proponent)
        .unwrap();
    assert_eq!(
        entries[opening].metadata["argument"]["content_violation"],
        serde_json::json!(["offensive"])
    );

    let intervention = &entries[opening + 1];
    assert_eq!(intervention.kind, EntryKind::Intervention);
    assert_eq!(intervention.speaker, Speaker::Moderator);
    assert_eq!(
        intervention.metadata["intervention"]["kind"],
        "inappropriate_content"
    );
    assert_eq!(outcome.log.count(EntryKind::Intervention), 1);

    let analytics = &outcome.analytics;
    assert_eq!(analytics.intervention_counts.values().sum::<usize>(), 1);
    assert_eq!(analytics.intervention_counts.get("inappropriate_content"), Some(&1));
    assert_eq!(analytics.total_interventions, 1);
    assert_eq!(outcome.state.inappropriate_content_count, 1);
}

#[tokio::test]
async fn test_outcome_serializes_log_and_analytics() {
    let outcome = run(DebateConfig::new(TOPIC).with_rounds(1).with_fact_checking(false)).await;
    let value = serde_json::to_value(&outcome).unwrap();
    assert!(value["log"].is_array());
    assert!(value["analytics"]["speaker_balance"].is_number());
}

#[test]
fn test_validation_errors() {
    let llm = Arc::new(MockProvider::smart());
    for config in [
        DebateConfig::new(""),
        DebateConfig::new(TOPIC).with_rounds(0),
        DebateConfig::new(TOPIC).with_points(6),
    ] {
        assert!(matches!(
            DebateOrchestrator::new(config, llm.clone()),
            Err(DebateError::Validation(_))
        ));
    }
    assert_eq!(llm.calls(), 0);
}

proptest! {
    #[test]
    fn rounds_outside_one_to_five_are_rejected(rounds in 0u8..=20, points in 0u8..=20) {
        let config = DebateConfig::new(TOPIC).with_rounds(rounds).with_points(points);
        let valid = (1..=5).contains(&rounds) && (1..=5).contains(&points);
        prop_assert_eq!(config.validate().is_ok(), valid);
    }
}
