//! Heuristic claim, evidence and weakness extraction over raw statements

use agora_core::text;
use serde::{Deserialize, Serialize};

/// Word count treated as a full-length statement when scoring
pub const FULL_LENGTH_WORDS: f64 = 150.0;
/// Strength ceiling for statements with no extractable claims
pub const LOW_EVIDENCE_CEILING: f64 = 0.35;

const CLAIM_MARKERS: &[&str] = &[
    "is", "are", "was", "were", "will", "would", "can", "should", "must", "has", "have",
    "leads", "causes", "shows", "show", "found", "increases", "reduces", "improves",
    "fell", "rose", "saves", "remain", "widens", "benefits",
];

const EVIDENCE_MARKERS: &[&str] = &[
    "study", "studies", "research", "survey", "data", "according to", "report", "evidence",
    "found", "percent", "statistics", "analysis",
];

const UNIVERSAL: &[&str] = &["always", "never", "all ", "none ", "every ", "no one", "everyone"];
const VAGUE: &[&str] = &["many", "some ", "often", "rarely", "significant"];
const CAUSAL: &[&str] = &["because", "therefore", "causes", "leads to", "results in", "due to"];
const STATISTICAL: &[&str] = &["%", "percent", "statistics", "data shows"];
const LOADED: &[&str] = &[
    "obvious", "clearly", "undeniable", "proven", "definitely", "absolutely", "certainly",
    "everyone knows", "must",
];

const PRO_MARKERS: &[&str] = &[
    "in favor", "support", "benefit", "improve", "advantage", "gain", "saves", "widens",
    "deserves", "should be adopted",
];
const CON_MARKERS: &[&str] = &[
    "against", "reject", "harm", "risk", "isolat", "cost", "drawback", "suffer", "fails",
    "should not",
];

/// Category of argumentative weakness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessKind {
    Universal,
    Statistical,
    Causal,
    LoadedLanguage,
    VagueQuantifier,
    Complexity,
}

impl WeaknessKind {
    /// Fixed severity used to prioritise counter-points
    pub fn severity(&self) -> f64 {
        match self {
            WeaknessKind::Universal => 0.8,
            WeaknessKind::Statistical => 0.7,
            WeaknessKind::Causal => 0.6,
            WeaknessKind::LoadedLanguage => 0.5,
            WeaknessKind::VagueQuantifier => 0.4,
            WeaknessKind::Complexity => 0.3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WeaknessKind::Universal => "Universal claim - exceptions likely exist",
            WeaknessKind::Statistical => "Statistical claim - source and methodology unclear",
            WeaknessKind::Causal => "Causal claim - mechanism not established",
            WeaknessKind::LoadedLanguage => "Loaded language - assertion substitutes for support",
            WeaknessKind::VagueQuantifier => "Vague quantifier - no specific figures given",
            WeaknessKind::Complexity => "Complex structure - key assumptions are buried",
        }
    }

    fn counter(&self) -> &'static str {
        match self {
            WeaknessKind::Universal => "Point to the exceptions that break the generalisation",
            WeaknessKind::Statistical => "Question where the figure comes from and what it measures",
            WeaknessKind::Causal => "Show that correlation does not establish the claimed cause",
            WeaknessKind::LoadedLanguage => "Ask for the evidence behind the assertion",
            WeaknessKind::VagueQuantifier => "Demand concrete numbers",
            WeaknessKind::Complexity => "Break the reasoning into steps and test each one",
        }
    }
}

/// A weakness found in one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
    pub kind: WeaknessKind,
    pub severity: f64,
    pub excerpt: String,
}

/// Everything extracted from one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub claims: Vec<String>,
    pub evidence: Vec<String>,
    /// Most severe first
    pub weaknesses: Vec<Weakness>,
    /// Aligned with `weaknesses`
    pub counter_points: Vec<String>,
    pub specificity: f64,
    pub word_count: usize,
}

impl Analysis {
    pub fn low_evidence(&self) -> bool {
        self.claims.is_empty()
    }

    /// Share of evidence-bearing claims, in [0, 1]
    pub fn evidence_strength(&self) -> f64 {
        if self.claims.is_empty() {
            0.0
        } else {
            (self.evidence.len() as f64 / self.claims.len() as f64).min(1.0)
        }
    }
}

fn contains_word(sentence_lower: &str, word: &str) -> bool {
    sentence_lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

/// Declarative sentences of five or more words carrying a claim marker or a figure
pub fn extract_claims(statement: &str) -> Vec<String> {
    text::sentences(statement)
        .into_iter()
        .filter(|s| !s.ends_with('?') && text::word_count(s) >= 5)
        .filter(|s| {
            let lower = s.to_lowercase();
            s.chars().any(|c| c.is_ascii_digit())
                || CLAIM_MARKERS.iter().any(|m| contains_word(&lower, m))
        })
        .collect()
}

/// Sentences citing a source, study or figure
pub fn extract_evidence(statement: &str) -> Vec<String> {
    text::sentences(statement)
        .into_iter()
        .filter(|s| {
            let lower = s.to_lowercase();
            EVIDENCE_MARKERS.iter().any(|m| lower.contains(m))
                || s.chars().any(|c| c.is_ascii_digit())
        })
        .collect()
}

/// Weaknesses in each claim, each kind at most once per sentence, most severe first
pub fn detect_weaknesses(statement: &str) -> Vec<Weakness> {
    let mut found = Vec::new();
    for sentence in extract_claims(statement) {
        let lower = format!("{} ", sentence.to_lowercase());
        let mut push = |kind: WeaknessKind| {
            found.push(Weakness {
                kind,
                severity: kind.severity(),
                excerpt: sentence.clone(),
            })
        };
        if UNIVERSAL.iter().any(|m| lower.contains(m)) {
            push(WeaknessKind::Universal);
        }
        if STATISTICAL.iter().any(|m| lower.contains(m)) {
            push(WeaknessKind::Statistical);
        }
        if CAUSAL.iter().any(|m| lower.contains(m)) {
            push(WeaknessKind::Causal);
        }
        if LOADED.iter().any(|m| lower.contains(m)) {
            push(WeaknessKind::LoadedLanguage);
        }
        if VAGUE.iter().any(|m| lower.contains(m)) {
            push(WeaknessKind::VagueQuantifier);
        }
        if text::word_count(&sentence) > 35 {
            push(WeaknessKind::Complexity);
        }
    }
    found.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    found
}

/// Counter-point for each weakness, in the same order
pub fn counter_points(weaknesses: &[Weakness]) -> Vec<String> {
    weaknesses
        .iter()
        .map(|w| format!("{}: \"{}\"", w.kind.counter(), w.excerpt))
        .collect()
}

pub fn analyze(statement: &str) -> Analysis {
    let weaknesses = detect_weaknesses(statement);
    Analysis {
        claims: extract_claims(statement),
        evidence: extract_evidence(statement),
        counter_points: counter_points(&weaknesses),
        weaknesses,
        specificity: text::specificity(statement),
        word_count: text::word_count(statement),
    }
}

/// Strength in [0, 1]; non-decreasing in evidence count
pub fn strength(evidence_count: usize, specificity: f64, words: usize, low_evidence: bool) -> f64 {
    let evidence = 1.0 - (-0.6 * evidence_count as f64).exp();
    let length = (words as f64 / FULL_LENGTH_WORDS).min(1.0);
    let raw = 0.5 * evidence + 0.3 * specificity.clamp(0.0, 1.0) + 0.2 * length;
    let capped = if low_evidence {
        raw.min(LOW_EVIDENCE_CEILING)
    } else {
        raw
    };
    capped.clamp(0.0, 1.0)
}

/// Share of markers aligned with the given side, 0.5 when there are none
pub fn stance_position(statement: &str, in_favor: bool) -> f64 {
    let lower = statement.to_lowercase();
    let pro = PRO_MARKERS.iter().filter(|m| lower.contains(*m)).count() as f64;
    let con = CON_MARKERS.iter().filter(|m| lower.contains(*m)).count() as f64;
    if pro + con == 0.0 {
        return 0.5;
    }
    if in_favor {
        pro / (pro + con)
    } else {
        con / (pro + con)
    }
}

/// `1 - min(1, 4 * variance)`; fewer than two positions are fully consistent
pub fn consistency(positions: &[f64]) -> f64 {
    if positions.len() < 2 {
        return 1.0;
    }
    let n = positions.len() as f64;
    let mean = positions.iter().sum::<f64>() / n;
    let variance = positions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    1.0 - (4.0 * variance).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Remote work always improves output. Studies from 2023 show that 68% of teams were more productive. \
                          Is this the future? Clearly, everyone benefits because commuting disappears.";

    #[test]
    fn test_extracts_claims_and_skips_questions() {
        let claims = extract_claims(SAMPLE);
        assert_eq!(claims.len(), 3);
        assert!(claims.iter().all(|c| !c.ends_with('?')));
    }

    #[test]
    fn test_extracts_evidence() {
        let evidence = extract_evidence(SAMPLE);
        assert_eq!(evidence.len(), 1);
        assert!(evidence[0].contains("68%"));
    }

    #[test]
    fn test_weaknesses_sorted_by_severity() {
        let w = detect_weaknesses(SAMPLE);
        assert_eq!(w[0].kind, WeaknessKind::Universal);
        assert!(w.windows(2).all(|p| p[0].severity >= p[1].severity));
        assert!(w.iter().any(|x| x.kind == WeaknessKind::Statistical));
        assert!(w.iter().any(|x| x.kind == WeaknessKind::Causal));
        assert!(w.iter().any(|x| x.kind == WeaknessKind::LoadedLanguage));
        assert_eq!(counter_points(&w).len(), w.len());
    }

    #[test]
    fn test_low_evidence_caps_strength() {
        let a = analyze("Hello there.");
        assert!(a.low_evidence());
        assert!(strength(10, 1.0, 300, true) <= LOW_EVIDENCE_CEILING);
        assert!(strength(3, 0.5, 100, false) > LOW_EVIDENCE_CEILING);
    }

    #[test]
    fn test_strength_monotonic_in_evidence() {
        let mut last = 0.0;
        for n in 0..10 {
            let s = strength(n, 0.4, 80, false);
            assert!(s >= last);
            last = s;
        }
    }

    #[test]
    fn test_consistency() {
        assert_eq!(consistency(&[0.7]), 1.0);
        assert_eq!(consistency(&[0.8, 0.8, 0.8]), 1.0);
        assert!((consistency(&[1.0, 0.0]) - 0.0).abs() < 1e-9);
        assert!(consistency(&[0.9, 0.7]) > 0.9);
    }

    #[test]
    fn test_stance_position() {
        assert!(stance_position("We support this because of the benefit", true) > 0.9);
        assert!(stance_position("We reject it because of the harm", false) > 0.9);
        assert_eq!(stance_position("Neutral text", true), 0.5);
    }
}
