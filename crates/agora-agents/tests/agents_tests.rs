//! Cross-role behaviour: debaters, verifier and moderator sharing one provider

use agora_agents::extraction::{consistency, strength};
use agora_agents::{
    DebateAgent, DebateParameters, DebateStage, DebateStyle, FactVerifier, ModeratorMonitor,
    Speaker, Stance, Submission, VerificationStatus,
};
use agora_core::Feedback;
use agora_llm::MockProvider;
use proptest::prelude::*;
use std::sync::Arc;

const TOPIC: &str = "Remote work should be mandatory";

#[tokio::test]
async fn test_opening_and_rebuttal_exchange() {
    let llm = Arc::new(MockProvider::smart());
    let params = DebateParameters::default();
    let mut pro = DebateAgent::new("Proponent", Stance::InFavor, DebateStyle::Formal, llm.clone());
    let mut con = DebateAgent::new("Opponent", Stance::Against, DebateStyle::Formal, llm.clone());

    let pro_opening = pro.opening_statement(TOPIC, &params).await;
    let con_opening = con.opening_statement(TOPIC, &params).await;
    assert!(pro_opening.content().contains("in favor of the motion"));
    assert!(con_opening.content().contains("against the motion"));

    let rebuttal = con.rebuttal(TOPIC, pro_opening.content(), &params).await;
    assert!(!rebuttal.metadata.degraded);
    assert!(rebuttal.metadata.addressed_points.len() <= params.points_per_argument as usize);
    assert_eq!(con.opponent_arguments().len(), 1);
    assert_eq!(con.arguments().len(), 2);
    assert!((0.0..=1.0).contains(&rebuttal.argument.strength));
}

#[tokio::test]
async fn test_verifier_checks_debater_output() {
    let llm = Arc::new(MockProvider::smart());
    let params = DebateParameters::default();
    let mut pro = DebateAgent::new("Proponent", Stance::InFavor, DebateStyle::Academic, llm.clone());
    let verifier = FactVerifier::new(llm.clone());

    let opening = pro.opening_statement(TOPIC, &params).await;
    let report = verifier.check_statement(opening.content()).await;
    assert!(report.claims.len() >= 2);
    assert!(report
        .claims
        .iter()
        .any(|c| c.status == VerificationStatus::Verified));
    assert!(report
        .claims
        .iter()
        .any(|c| c.status == VerificationStatus::Refuted && c.claim.contains("always")));

    let misses = verifier.stats().cache_misses;
    let again = verifier.check_statement(opening.content()).await;
    assert_eq!(again, report);
    assert_eq!(verifier.stats().cache_misses, misses);
    assert_eq!(verifier.stats().cache_hits, report.claims.len() as u64);

    for claim in &report.claims {
        let feedback = Feedback::new(&claim.claim, claim.evidence_likelihood).from_source("fact_checker");
        let outcome = pro.receive_feedback(feedback);
        assert!(outcome.new_belief.is_some() || !outcome.reinforced.is_empty());
    }
}

#[tokio::test]
async fn test_moderator_reviews_real_statements() {
    let llm = Arc::new(MockProvider::smart());
    let params = DebateParameters::default();
    let mut pro = DebateAgent::new("Proponent", Stance::InFavor, DebateStyle::Casual, llm.clone());
    let mut con = DebateAgent::new("Opponent", Stance::Against, DebateStyle::Casual, llm.clone());
    let mut moderator = ModeratorMonitor::new(TOPIC, llm.clone());

    moderator.introduce().await;
    moderator.advance(DebateStage::Opening).unwrap();

    moderator.record_handover(Speaker::Proponent);
    let pro_opening = pro.opening_statement(TOPIC, &params).await;
    let report = moderator.review(&Submission::new(
        Speaker::Proponent,
        DebateStage::Opening,
        pro_opening.content(),
        moderator.policy(),
    ));
    assert!(report.is_clean(), "{:?}", report.violations);

    moderator.transition(Speaker::Opponent).await;
    let con_opening = con.opening_statement(TOPIC, &params).await;
    let report = moderator.review(&Submission::new(
        Speaker::Opponent,
        DebateStage::Opening,
        con_opening.content(),
        moderator.policy(),
    ));
    assert!(report.is_clean(), "{:?}", report.violations);

    moderator.advance(DebateStage::Closing).unwrap();
    let closing = moderator.close().await;
    assert_eq!(closing.analytics.total_interventions, 0);
    assert!(closing.analytics.topic_adherence > 0.9);
    assert!(closing.analytics.speaker_balance > 0.5);
}

proptest! {
    #[test]
    fn strength_is_bounded_and_monotone(
        evidence in 0usize..20,
        specificity in 0.0f64..=1.0,
        words in 0usize..400,
        low in any::<bool>(),
    ) {
        let s = strength(evidence, specificity, words, low);
        prop_assert!((0.0..=1.0).contains(&s));
        prop_assert!(strength(evidence + 1, specificity, words, low) >= s);
        if low {
            prop_assert!(s <= agora_agents::extraction::LOW_EVIDENCE_CEILING);
        }
    }

    #[test]
    fn consistency_is_bounded(positions in proptest::collection::vec(0.0f64..=1.0, 0..12)) {
        let c = consistency(&positions);
        prop_assert!((0.0..=1.0).contains(&c));
    }
}
