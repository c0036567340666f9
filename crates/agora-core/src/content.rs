//! Disallowed-term filtering for generated output

use once_cell::sync::Lazy;
use regex::Regex;

/// Terms no agent output may contain
pub const DISALLOWED_TERMS: [&str; 7] = [
    "violent",
    "abusive",
    "hate",
    "discriminatory",
    "threatening",
    "explicit",
    "offensive",
];

static DEFAULT_FILTER: Lazy<ContentFilter> = Lazy::new(|| ContentFilter::with_terms(&DISALLOWED_TERMS));

/// Matches disallowed terms at word start, case-insensitively, so
/// inflections ("hateful", "Offensively") are caught while embedded
/// substrings ("whatever") are not
#[derive(Debug, Clone)]
pub struct ContentFilter {
    terms: Vec<String>,
    pattern: Option<Regex>,
}

impl ContentFilter {
    /// Filter for a custom term list
    pub fn with_terms<S: AsRef<str>>(terms: &[S]) -> Self {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b({alternation})")).ok()
        };
        Self { terms, pattern }
    }

    /// Configured terms
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Distinct disallowed terms found in `text`, in first-match order
    pub fn violations(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let mut found: Vec<String> = Vec::new();
        for caps in pattern.captures_iter(text) {
            let term = caps[1].to_lowercase();
            if !found.contains(&term) {
                found.push(term);
            }
        }
        found
    }

    /// True when no disallowed term occurs
    pub fn is_clean(&self, text: &str) -> bool {
        self.pattern.as_ref().map_or(true, |p| !p.is_match(text))
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_start_matching() {
        let filter = ContentFilter::default();
        assert_eq!(filter.violations("That was a hateful remark"), vec!["hate"]);
        assert_eq!(filter.violations("OFFENSIVELY put"), vec!["offensive"]);
        assert!(filter.is_clean("whatever the cost, that is the question"));
        assert!(filter.is_clean("Remote work improves productivity"));
    }

    #[test]
    fn test_distinct_terms() {
        let filter = ContentFilter::default();
        let found = filter.violations("hate, hate and violent threatening words");
        assert_eq!(found, vec!["hate", "violent", "threatening"]);
    }

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = ContentFilter::with_terms::<&str>(&[]);
        assert!(filter.is_clean("violent"));
        assert!(filter.violations("violent").is_empty());
    }
}
