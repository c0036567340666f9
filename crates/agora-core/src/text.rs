//! Deterministic text heuristics shared by perception, belief matching and
//! argument scoring

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
        "was", "one", "our", "out", "has", "have", "his", "how", "its", "who", "why", "this",
        "that", "with", "from", "they", "them", "their", "there", "then", "than", "these",
        "those", "what", "when", "where", "which", "while", "will", "would", "should", "could",
        "been", "being", "into", "about", "over", "such", "also", "very", "more", "most",
        "some", "only", "just", "each", "other", "does", "did", "were", "your", "yours",
        "because", "therefore", "however", "motion",
    ]
    .into_iter()
    .collect()
});

const NEGATIONS: [&str; 8] = [
    "not", "no", "never", "cannot", "against", "false", "nor", "without",
];

const POSITIVE: [&str; 14] = [
    "benefit", "improve", "gain", "support", "strong", "success", "agree", "effective",
    "valuable", "progress", "advantage", "better", "correct", "good",
];

const NEGATIVE: [&str; 14] = [
    "harm", "risk", "fail", "weak", "wrong", "flaw", "disagree", "problem", "cost", "worse",
    "mislead", "isolat", "decline", "bad",
];

/// Coarse polarity of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Lowercase alphanumeric tokens
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '%'))
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn normalize_term(token: &str) -> String {
    let plural = token.ends_with('s')
        && !(token.ends_with("ss") || token.ends_with("us") || token.ends_with("is"));
    if token.len() > 3 && plural {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

/// Content-bearing terms in first-seen order, without duplicates
pub fn key_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens(text)
        .into_iter()
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t.as_str()))
        .map(|t| normalize_term(&t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Jaccard similarity of two term lists
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

/// Fraction of `needles` found in `haystack`
pub fn coverage(needles: &[String], haystack: &[String]) -> f64 {
    if needles.is_empty() {
        return 0.0;
    }
    let hay: HashSet<&String> = haystack.iter().collect();
    needles.iter().filter(|n| hay.contains(n)).count() as f64 / needles.len() as f64
}

/// Whether the text carries an explicit negation
pub fn has_negation(text: &str) -> bool {
    tokens(text)
        .iter()
        .any(|t| NEGATIONS.contains(&t.as_str()) || t.ends_with("n't"))
}

/// Lexicon polarity and its magnitude in [0, 1]
pub fn sentiment(text: &str) -> (Sentiment, f64) {
    let toks = tokens(text);
    let count = |lexicon: &[&str]| {
        toks.iter()
            .filter(|t| lexicon.iter().any(|w| t.starts_with(w)))
            .count() as f64
    };
    let pos = count(&POSITIVE);
    let neg = count(&NEGATIVE);
    if pos + neg == 0.0 {
        return (Sentiment::Neutral, 0.0);
    }
    let magnitude = ((pos - neg).abs() / (pos + neg)) * ((pos + neg) / 3.0).min(1.0);
    let polarity = if pos > neg {
        Sentiment::Positive
    } else if neg > pos {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    (polarity, magnitude.clamp(0.0, 1.0))
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text into trimmed sentences
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            push_sentence(&mut out, &mut current);
            continue;
        }
        current.push(c);
        let boundary = matches!(c, '.' | '!' | '?')
            && chars.get(i + 1).map_or(true, |n| n.is_whitespace());
        if boundary {
            push_sentence(&mut out, &mut current);
        }
    }
    push_sentence(&mut out, &mut current);
    out
}

fn push_sentence(out: &mut Vec<String>, current: &mut String) {
    let trimmed = current
        .trim()
        .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•')
        .trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    current.clear();
}

/// Share of concrete tokens (figures, percentages, proper nouns), scaled to [0, 1]
pub fn specificity(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let concrete = words
        .iter()
        .enumerate()
        .filter(|(i, w)| {
            w.chars().any(|c| c.is_ascii_digit())
                || w.contains('%')
                || (*i > 0
                    && w.chars().next().is_some_and(char::is_uppercase)
                    && !words[i - 1].ends_with('.'))
        })
        .count() as f64;
    (3.0 * concrete / words.len() as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_terms_drop_stopwords_and_plurals() {
        let terms = key_terms("The workers should have remote jobs and the workers agree");
        assert_eq!(terms, vec!["worker", "remote", "job", "agree"]);
    }

    #[test]
    fn test_jaccard_and_coverage() {
        let a = key_terms("remote work mandatory");
        let b = key_terms("remote work optional");
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
        assert!((coverage(&a, &b) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negation() {
        assert!(has_negation("Remote work is not productive"));
        assert!(has_negation("It doesn't help"));
        assert!(!has_negation("Remote work is productive"));
    }

    #[test]
    fn test_sentiment() {
        let (s, m) = sentiment("This policy will improve outcomes and benefit everyone");
        assert_eq!(s, Sentiment::Positive);
        assert!(m > 0.0 && m <= 1.0);
        assert_eq!(sentiment("The sky").0, Sentiment::Neutral);
    }

    #[test]
    fn test_sentences_keep_decimals() {
        let s = sentences("Growth was 2.5% last year. It will rise!\n- Next point");
        assert_eq!(s, vec!["Growth was 2.5% last year.", "It will rise!", "Next point"]);
    }

    #[test]
    fn test_specificity_rewards_figures() {
        assert!(specificity("In 2023 about 68% of Stanford staff agreed") > specificity("people tend to agree"));
        assert_eq!(specificity(""), 0.0);
    }
}
