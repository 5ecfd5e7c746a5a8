//! Text helpers shared by the matching and tailoring engines.
//!
//! Tokens are lowercase runs of alphanumerics plus `+`, `#` and inner `.`,
//! so "C++", "C#" and "Node.js" survive as single tokens.

use std::collections::BTreeSet;

/// Words that carry no signal for relevance scoring.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "to", "with", "we", "you", "our", "your", "will",
];

/// Splits text into lowercase tokens, preserving order and duplicates.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#' || c == '.'))
        .map(|raw| raw.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Distinct tokens with stop-words removed, unless that would leave nothing.
pub fn content_terms(text: &str) -> BTreeSet<String> {
    let all: BTreeSet<String> = tokenize(text).into_iter().collect();
    let filtered: BTreeSet<String> = all
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() {
        all
    } else {
        filtered
    }
}

/// Fraction of `terms` present in `document`. Empty `terms` scores 0.0.
pub fn overlap_ratio(terms: &BTreeSet<String>, document: &BTreeSet<String>) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let hits = terms.iter().filter(|t| document.contains(*t)).count();
    hits as f64 / terms.len() as f64
}

/// Canonical form for skill names: trimmed, lowercased, single-spaced.
pub fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Collapses runs of whitespace and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when `phrase` (already tokenized) appears contiguously in `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|w| w == phrase)
}
