//! Claim verification with a write-once cache and statement-level aggregation
//!
//! A [`FactVerifier`] is shared by reference across concurrent checks. The
//! cache is a moka future cache, so concurrent checks of the same claim share
//! one generation. The agent's bookkeeping sits behind a `Mutex` that is
//! never held across a generation call.

use agora_core::{
    text, Agent, AgentConfig, AgentError, Goal, Input, InputKind, Memory, MemoryKind, Personality,
};
use agora_llm::{LlmError, LlmProvider, LlmRequest};
use futures::future::join_all;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::extraction;

/// Confidence at or above which a result is labelled [`AccuracyLabel::High`]
pub const HIGH_THRESHOLD: f64 = 0.8;
/// Confidence at or above which a result is labelled [`AccuracyLabel::Medium`]
pub const MEDIUM_THRESHOLD: f64 = 0.6;
/// Confidence below which a report is inconclusive
pub const LOW_THRESHOLD: f64 = 0.4;

/// Upper bound on cached verdicts
pub const CACHE_CAPACITY: u64 = 10_000;

const UNIVERSAL_MARKERS: [&str; 4] = ["always", "never", "every", "everyone"];
const NEGATIONS: [&str; 3] = ["not", "no", "never"];
/// Words a negation may reach across before it lapses ("not well supported")
const NEGATION_REACH: usize = 2;

/// Verdict for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    Refuted,
    Uncertain,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Refuted => "refuted",
            VerificationStatus::Uncertain => "uncertain",
        }
    }

    /// First verdict word in `text`, honouring `not`/`no` and `un-`/`in-`
    /// negations
    fn parse(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let mut since_negation: Option<usize> = None;
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if NEGATIONS.contains(&word) {
                since_negation = Some(0);
                continue;
            }
            let negated = since_negation.is_some_and(|n| n <= NEGATION_REACH);
            if let Some(status) = Self::classify(word) {
                return Some(if negated {
                    Self::negate(word, status)
                } else {
                    status
                });
            }
            let prefixed = ["un", "in"]
                .iter()
                .filter_map(|prefix| word.strip_prefix(prefix))
                .find(|root| Self::classify(root) == Some(VerificationStatus::Verified));
            if let Some(root) = prefixed {
                // "not untrue" commits to nothing
                return Some(if negated {
                    VerificationStatus::Uncertain
                } else {
                    Self::negate(root, VerificationStatus::Verified)
                });
            }
            since_negation = since_negation.map(|n| n + 1);
        }
        None
    }

    fn classify(word: &str) -> Option<Self> {
        match word {
            "verified" | "true" | "supported" | "accurate" | "correct" | "confirmed" => {
                Some(VerificationStatus::Verified)
            }
            "refuted" | "false" | "misleading" | "wrong" | "disproven" => {
                Some(VerificationStatus::Refuted)
            }
            "uncertain" | "unclear" | "unknown" | "undetermined" | "inconclusive"
            | "unverifiable" => Some(VerificationStatus::Uncertain),
            _ => None,
        }
    }

    /// A claim that is "not verified" is unestablished; one that is "not
    /// true" is refuted; negating anything else commits to nothing
    fn negate(root: &str, status: Self) -> Self {
        match status {
            VerificationStatus::Verified if matches!(root, "verified" | "confirmed") => {
                VerificationStatus::Uncertain
            }
            VerificationStatus::Verified => VerificationStatus::Refuted,
            _ => VerificationStatus::Uncertain,
        }
    }
}

/// Confidence bucket, independent of status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyLabel {
    High,
    Medium,
    Low,
}

impl AccuracyLabel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_THRESHOLD {
            AccuracyLabel::High
        } else if confidence >= MEDIUM_THRESHOLD {
            AccuracyLabel::Medium
        } else {
            AccuracyLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccuracyLabel::High => "high",
            AccuracyLabel::Medium => "medium",
            AccuracyLabel::Low => "low",
        }
    }
}

/// Result of verifying one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim: String,
    pub status: VerificationStatus,
    pub confidence: f64,
    /// How strongly the available evidence supports the claim
    pub evidence_likelihood: f64,
    pub accuracy: AccuracyLabel,
    pub evidence: Vec<String>,
    /// Set when the verdict could not be obtained or parsed
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn new(claim: &str, status: VerificationStatus, confidence: f64, evidence: Vec<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let evidence_likelihood = match status {
            VerificationStatus::Verified => confidence,
            VerificationStatus::Refuted => 1.0 - confidence,
            VerificationStatus::Uncertain => 0.5,
        };
        Self {
            claim: claim.to_string(),
            status,
            confidence,
            evidence_likelihood,
            accuracy: AccuracyLabel::from_confidence(confidence),
            evidence,
            error: None,
        }
    }

    /// Uncertain result with zero confidence
    pub fn undetermined(claim: &str, error: String) -> Self {
        let mut result = Self::new(claim, VerificationStatus::Uncertain, 0.0, Vec::new());
        result.error = Some(error);
        result
    }
}

/// Statement-level verdict aggregated from its claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementReport {
    pub statement: String,
    /// In claim order
    pub claims: Vec<VerificationResult>,
    pub status: VerificationStatus,
    pub confidence: f64,
    pub accuracy: AccuracyLabel,
    pub conclusive: bool,
}

/// Write-once verification cache keyed by normalised claim text
#[derive(Debug)]
pub struct FactCache {
    entries: Cache<String, VerificationResult>,
}

impl Default for FactCache {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY)
    }
}

impl FactCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    /// SHA-256 of the lowercased, whitespace-collapsed claim without trailing punctuation
    pub fn key(claim: &str) -> String {
        let normalized = claim
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end_matches(|c: char| c.is_ascii_punctuation() && c != '%')
            .to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn get(&self, claim: &str) -> Option<VerificationResult> {
        self.entries.get(&Self::key(claim)).await
    }

    /// Stored result for `claim`, running `init` on a miss.
    ///
    /// Concurrent callers on the same key share a single `init`; the flag is
    /// true only for the caller whose `init` produced the value. Errors are
    /// handed to every waiting caller and nothing is stored.
    pub async fn get_or_try_insert_with<F, E>(
        &self,
        claim: &str,
        init: F,
    ) -> Result<(VerificationResult, bool), Arc<E>>
    where
        F: Future<Output = Result<VerificationResult, E>>,
        E: Send + Sync + 'static,
    {
        let entry = self
            .entries
            .entry(Self::key(claim))
            .or_try_insert_with(init)
            .await?;
        let fresh = entry.is_fresh();
        Ok((entry.into_value(), fresh))
    }

    pub async fn len(&self) -> usize {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Cache and generation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Agent that checks factual claims in debate statements
#[derive(Debug)]
pub struct FactVerifier<L: LlmProvider> {
    agent: Mutex<Agent>,
    llm: Arc<L>,
    cache: FactCache,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<L: LlmProvider> FactVerifier<L> {
    pub fn new(llm: Arc<L>) -> Self {
        let config = AgentConfig::named(
            "FactChecker",
            "You are a careful fact checker. Judge claims only on well-established knowledge \
             and say when the evidence is insufficient.",
        );
        let agent = Agent::new(config, Personality::fact_checker())
            .with_goal(Goal::new("Verify factual accuracy", 0.95))
            .with_goal(Goal::new("Identify misleading statements", 0.9));
        Self {
            agent: Mutex::new(agent),
            llm,
            cache: FactCache::default(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &FactCache {
        &self.cache
    }

    pub fn stats(&self) -> VerifierStats {
        VerifierStats {
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Progress of each goal, in declaration order
    pub async fn goal_progress(&self) -> Vec<(String, f64)> {
        self.agent
            .lock()
            .await
            .goals
            .iter()
            .map(|g| (g.description.clone(), g.progress()))
            .collect()
    }

    pub async fn memory_count(&self) -> usize {
        self.agent.lock().await.memories.len()
    }

    /// Claims worth checking: declarative sentences carrying figures,
    /// citations or universal language
    pub fn extract_claims(statement: &str) -> Vec<String> {
        extraction::extract_claims(statement)
            .into_iter()
            .filter(|claim| {
                let lower = claim.to_lowercase();
                claim.chars().any(|c| c.is_ascii_digit())
                    || !extraction::extract_evidence(claim).is_empty()
                    || text::tokens(&lower)
                        .iter()
                        .any(|t| UNIVERSAL_MARKERS.contains(&t.as_str()))
            })
            .collect()
    }

    /// Extract, verify and aggregate the claims in a statement
    pub async fn check_statement(&self, statement: &str) -> StatementReport {
        let claims = Self::extract_claims(statement);
        let results = self.check_claims(&claims).await;
        let report = aggregate(statement, results);
        tracing::info!(
            status = report.status.as_str(),
            confidence = report.confidence,
            claims = report.claims.len(),
            "Statement checked"
        );
        report
    }

    /// Verify claims concurrently; results mirror input order
    pub async fn check_claims(&self, claims: &[String]) -> Vec<VerificationResult> {
        join_all(claims.iter().map(|c| self.verify_claim(c))).await
    }

    /// Verify a single claim, consulting the cache first
    pub async fn verify_claim(&self, claim: &str) -> VerificationResult {
        match self
            .cache
            .get_or_try_insert_with(claim, self.generate_verdict(claim))
            .await
        {
            Ok((result, false)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("agora_fact_cache_hits_total").increment(1);
                tracing::debug!(claim_key = %FactCache::key(claim), "Fact cache hit");
                result
            }
            Ok((result, true)) => {
                self.count_miss(claim);
                self.record(&result).await;
                result
            }
            Err(err) => {
                self.count_miss(claim);
                // Transient; not cached so a later check can retry
                tracing::warn!(error = %err, "Verification generation failed");
                VerificationResult::undetermined(claim, err.to_string())
            }
        }
    }

    fn count_miss(&self, claim: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("agora_fact_cache_misses_total").increment(1);
        tracing::debug!(claim_key = %FactCache::key(claim), "Fact cache miss");
    }

    /// One generation call; an unparseable verdict becomes an undetermined result
    async fn generate_verdict(&self, claim: &str) -> Result<VerificationResult, LlmError> {
        let (system, options) = {
            let agent = self.agent.lock().await;
            (
                agent.config.role.clone(),
                agent.personality.generation_options(&Default::default()),
            )
        };
        let prompt = verification_prompt(claim);
        metrics::counter!("agora_generation_attempts_total").increment(1);
        let response = self
            .llm
            .complete(LlmRequest::with_role(&system, &prompt).options(options))
            .await?;
        Ok(match parse_verification(claim, &response.content) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(error = %err, "Unparseable verification");
                VerificationResult::undetermined(claim, err.to_string())
            }
        })
    }

    async fn record(&self, result: &VerificationResult) {
        let mut agent = self.agent.lock().await;
        agent.perceive(
            Input::new(InputKind::FactCheck, format!("Verified claim: {}", result.claim))
                .from_source("fact_checker"),
        );
        agent.settle();
        let memory = Memory::new(
            format!(
                "Verified claim: {}\nStatus: {}\nConfidence: {:.2}",
                result.claim,
                result.status.as_str(),
                result.confidence
            ),
            result.confidence,
            MemoryKind::Semantic,
        )
        .with_context("type", "verification")
        .with_context("status", result.status.as_str())
        .with_context("source", "fact_checker");
        agent.memories.store(memory);

        let goal_index = match result.status {
            VerificationStatus::Verified => Some(0),
            VerificationStatus::Refuted => Some(1),
            VerificationStatus::Uncertain => None,
        };
        if let Some(goal) = goal_index.and_then(|i| agent.goals.get_mut(i)) {
            goal.advance(0.1);
        }
    }
}

pub fn verification_prompt(claim: &str) -> String {
    format!(
        "Verify this claim based on general knowledge.\n\
         Claim: {claim}\n\n\
         Please provide:\n\
         Status: Verified, Misleading, or Unverified\n\
         Confidence: a number between 0 and 1\n\
         Reason: a brief explanation\n\
         Sources: any known references"
    )
}

/// Parse a `Status / Confidence / Reason / Sources` response
pub fn parse_verification(claim: &str, response: &str) -> Result<VerificationResult, AgentError> {
    let mut status = None;
    let mut confidence = None;
    let mut evidence = Vec::new();

    for raw in response.lines() {
        let line = raw
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
            .trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "status" | "verdict" => status = VerificationStatus::parse(value),
            "confidence" => confidence = parse_confidence(value),
            "reason" | "reasoning" | "sources" | "source" | "evidence" if !value.is_empty() => {
                evidence.push(value.to_string())
            }
            _ => {}
        }
    }

    if status.is_none() {
        status = response.lines().next().and_then(VerificationStatus::parse);
    }
    let status = status.ok_or_else(|| {
        AgentError::ParseFailure(format!(
            "no verdict in response: {}",
            response.chars().take(80).collect::<String>()
        ))
    })?;
    Ok(VerificationResult::new(
        claim,
        status,
        confidence.unwrap_or(0.0),
        evidence,
    ))
}

/// `0.7`, `70%` and `70` all read as 0.7; other values above 1 clamp
fn parse_confidence(value: &str) -> Option<f64> {
    let rest = value.trim_start_matches(|c: char| !c.is_ascii_digit());
    let number: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let number = number.trim_end_matches('.');
    let parsed: f64 = number.parse().ok()?;
    let percent = rest[number.len()..].trim_start().starts_with('%');
    let whole_percent = parsed > 1.0 && parsed <= 100.0 && parsed.fract() == 0.0;
    let scaled = if percent || whole_percent {
        parsed / 100.0
    } else {
        parsed
    };
    Some(scaled.clamp(0.0, 1.0))
}

/// Weighted aggregation: weight `0.5 + 0.5 * specificity`, status by largest
/// total weight with ties resolved to uncertain
pub fn aggregate(statement: &str, results: Vec<VerificationResult>) -> StatementReport {
    if results.is_empty() {
        return StatementReport {
            statement: statement.to_string(),
            claims: results,
            status: VerificationStatus::Uncertain,
            confidence: 0.0,
            accuracy: AccuracyLabel::Low,
            conclusive: false,
        };
    }

    let mut total = 0.0;
    let mut weighted = 0.0;
    let mut by_status: [(VerificationStatus, f64); 3] = [
        (VerificationStatus::Verified, 0.0),
        (VerificationStatus::Refuted, 0.0),
        (VerificationStatus::Uncertain, 0.0),
    ];
    for result in &results {
        let weight = 0.5 + 0.5 * text::specificity(&result.claim);
        total += weight;
        weighted += weight * result.confidence;
        if let Some(slot) = by_status.iter_mut().find(|(s, _)| *s == result.status) {
            slot.1 += weight;
        }
    }
    let confidence = (weighted / total).clamp(0.0, 1.0);

    let max = by_status.iter().map(|(_, w)| *w).fold(0.0, f64::max);
    let leaders: Vec<VerificationStatus> = by_status
        .iter()
        .filter(|(_, w)| (*w - max).abs() < 1e-12)
        .map(|(s, _)| *s)
        .collect();
    let status = if leaders.len() == 1 {
        leaders[0]
    } else {
        VerificationStatus::Uncertain
    };

    StatementReport {
        statement: statement.to_string(),
        claims: results,
        status,
        confidence,
        accuracy: AccuracyLabel::from_confidence(confidence),
        conclusive: confidence >= LOW_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_llm::MockProvider;

    #[test]
    fn test_accuracy_label_ignores_status() {
        let refuted = VerificationResult::new("x", VerificationStatus::Refuted, 0.9, vec![]);
        assert_eq!(refuted.accuracy, AccuracyLabel::High);
        assert_eq!(AccuracyLabel::from_confidence(0.8), AccuracyLabel::High);
        assert_eq!(AccuracyLabel::from_confidence(0.79), AccuracyLabel::Medium);
        assert_eq!(AccuracyLabel::from_confidence(0.6), AccuracyLabel::Medium);
        assert_eq!(AccuracyLabel::from_confidence(0.59), AccuracyLabel::Low);
        assert!((refuted.evidence_likelihood - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_parse_verification() {
        let r = parse_verification(
            "c",
            "1. Status: Misleading\n2. Confidence: 70\n3. Reason: overgeneralises\n4. Sources: surveys",
        )
        .unwrap();
        assert_eq!(r.status, VerificationStatus::Refuted);
        assert!((r.confidence - 0.7).abs() < 1e-9);
        assert_eq!(r.evidence, vec!["overgeneralises", "surveys"]);

        let unverified = parse_verification("c", "Status: Unverified\nConfidence: 0.5").unwrap();
        assert_eq!(unverified.status, VerificationStatus::Uncertain);

        let cases = [
            ("Not supported", VerificationStatus::Refuted),
            ("Unsupported", VerificationStatus::Refuted),
            ("Untrue", VerificationStatus::Refuted),
            ("Inaccurate", VerificationStatus::Refuted),
            ("not well supported", VerificationStatus::Refuted),
            ("Not verified", VerificationStatus::Uncertain),
            ("Not misleading", VerificationStatus::Uncertain),
            ("Inconclusive", VerificationStatus::Uncertain),
            ("Verified", VerificationStatus::Verified),
            ("True, not misleading", VerificationStatus::Verified),
        ];
        for (verdict, expected) in cases {
            let response = format!("Status: {verdict}\nConfidence: 0.9");
            let r = parse_verification("c", &response).unwrap();
            assert_eq!(r.status, expected, "verdict {verdict:?}");
        }

        assert!(matches!(
            parse_verification("c", "I cannot say."),
            Err(AgentError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_parse_confidence_scales() {
        assert_eq!(parse_confidence("0.7"), Some(0.7));
        assert_eq!(parse_confidence("70"), Some(0.7));
        assert_eq!(parse_confidence("85.5%"), Some(0.855));
        assert_eq!(parse_confidence("about 40 %"), Some(0.4));
        assert_eq!(parse_confidence("1.5"), Some(1.0));
        assert_eq!(parse_confidence("250"), Some(1.0));
        assert_eq!(parse_confidence("high"), None);
    }

    #[test]
    fn test_cache_key_normalisation() {
        assert_eq!(
            FactCache::key("Remote  work saves 11000 dollars."),
            FactCache::key("remote work saves 11000 dollars")
        );
        assert_ne!(FactCache::key("68% agree"), FactCache::key("68 agree"));
    }

    #[test]
    fn test_aggregate_weighted() {
        let results = vec![
            VerificationResult::new("In 2023 68% agreed", VerificationStatus::Verified, 0.9, vec![]),
            VerificationResult::new("it is never fine", VerificationStatus::Refuted, 0.5, vec![]),
        ];
        let report = aggregate("s", results);
        assert_eq!(report.status, VerificationStatus::Verified);
        assert!(report.confidence > 0.7 && report.confidence < 0.9);
        assert!(report.conclusive);
    }

    #[test]
    fn test_aggregate_empty() {
        let report = aggregate("Hello.", vec![]);
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.accuracy, AccuracyLabel::Low);
        assert!(!report.conclusive);
    }

    #[tokio::test]
    async fn test_check_statement_is_idempotent() {
        let llm = Arc::new(MockProvider::smart());
        let verifier = FactVerifier::new(llm.clone());
        let statement = "Studies from 2023 show that 68% of teams reported higher productivity. \
                         This policy always widens access for caregivers.";
        let first = verifier.check_statement(statement).await;
        let calls = llm.calls();
        assert_eq!(calls, 2);
        let second = verifier.check_statement(statement).await;
        assert_eq!(first, second);
        assert_eq!(llm.calls(), calls);
        assert_eq!(verifier.stats().cache_hits, 2);
        assert_eq!(first.claims[0].status, VerificationStatus::Verified);
        assert_eq!(first.claims[1].status, VerificationStatus::Refuted);
    }

    #[tokio::test]
    async fn test_repeated_claim_generates_once() {
        let llm = Arc::new(MockProvider::smart());
        let verifier = FactVerifier::new(llm.clone());
        let claim = "Studies from 2023 show that 68% of teams reported higher productivity.";
        let statement = format!("{claim} {claim}");
        let report = verifier.check_statement(&statement).await;
        assert_eq!(report.claims.len(), 2);
        assert_eq!(report.claims[0], report.claims[1]);
        assert_eq!(llm.calls(), 1);
        assert_eq!(verifier.cache().len().await, 1);
        assert_eq!(
            verifier.stats(),
            VerifierStats {
                cache_hits: 1,
                cache_misses: 1
            }
        );
    }

    #[tokio::test]
    async fn test_check_claims_preserves_order() {
        let verifier = FactVerifier::new(Arc::new(MockProvider::smart()));
        let claims: Vec<String> = vec![
            "Remote teams never meet deadlines".into(),
            "About 41% of hires felt isolated".into(),
            "Managers prefer offices".into(),
        ];
        let results = verifier.check_claims(&claims).await;
        let order: Vec<&str> = results.iter().map(|r| r.claim.as_str()).collect();
        assert_eq!(order, claims.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(results[0].status, VerificationStatus::Refuted);
        assert_eq!(results[1].status, VerificationStatus::Verified);
        assert_eq!(results[2].status, VerificationStatus::Uncertain);
    }

    #[tokio::test]
    async fn test_goals_and_memories_updated() {
        let verifier = FactVerifier::new(Arc::new(MockProvider::smart()));
        verifier.verify_claim("About 41% of hires felt isolated").await;
        let progress = verifier.goal_progress().await;
        assert!((progress[0].1 - 0.1).abs() < 1e-9);
        assert_eq!(progress[1].1, 0.0);
        assert!(verifier.memory_count().await >= 1);
    }

    #[tokio::test]
    async fn test_generation_failure_not_cached() {
        let verifier = FactVerifier::new(Arc::new(MockProvider::failing(LlmError::RateLimited)));
        let r = verifier.verify_claim("About 41% of hires felt isolated").await;
        assert!(r.error.is_some());
        let r = verifier.verify_claim("About 41% of hires felt isolated").await;
        assert_eq!(r.status, VerificationStatus::Uncertain);
        assert_eq!(r.confidence, 0.0);
        assert!(r.error.is_some());
        assert!(verifier.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_unparseable_response_is_cached_as_uncertain() {
        let llm = Arc::new(MockProvider::constant("I would rather not say."));
        let verifier = FactVerifier::new(llm.clone());
        let r = verifier.verify_claim("Offices cost 11000 dollars").await;
        assert_eq!(r.status, VerificationStatus::Uncertain);
        assert_eq!(r.confidence, 0.0);
        verifier.verify_claim("Offices cost 11000 dollars").await;
        assert_eq!(llm.calls(), 1);
    }
}
