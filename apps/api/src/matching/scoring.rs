use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::{content_terms, overlap_ratio};

/// Skill score used when there is nothing to compare against.
pub const NEUTRAL_SKILL_SCORE: f64 = 0.5;

pub const DEFAULT_STALENESS_WINDOW_DAYS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skill: f64,
    pub relevance: f64,
    pub recency: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skill: 0.5,
            relevance: 0.3,
            recency: 0.2,
        }
    }
}

/// Tunables for the matching engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub weights: MatchWeights,
    /// Age in days at which a posting's recency score reaches zero.
    pub staleness_window_days: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: MatchWeights::default(),
            staleness_window_days: DEFAULT_STALENESS_WINDOW_DAYS,
        }
    }
}

/// Fraction of `required` covered by `candidate`.
///
/// `None` candidate, an empty candidate skill set, or an empty requirement set
/// all yield [`NEUTRAL_SKILL_SCORE`].
pub fn compute_skill_score(
    required: &BTreeSet<String>,
    candidate: Option<&BTreeSet<String>>,
) -> f64 {
    let candidate = match candidate {
        Some(skills) if !skills.is_empty() => skills,
        _ => return NEUTRAL_SKILL_SCORE,
    };
    if required.is_empty() {
        return NEUTRAL_SKILL_SCORE;
    }
    let covered = required.intersection(candidate).count();
    covered as f64 / required.len() as f64
}

/// Token overlap of the query terms against title + description.
pub fn compute_relevance(query_terms: &BTreeSet<String>, title: &str, description: &str) -> f64 {
    let document = content_terms(&format!("{title} {description}"));
    overlap_ratio(query_terms, &document)
}

/// Linear decay from 1.0 at `now` to 0.0 at `window_days` old.
/// Postings dated in the future score 1.0.
pub fn compute_recency_score(posted_at: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> f64 {
    if window_days <= 0 {
        return 0.0;
    }
    let age_seconds = (now - posted_at).num_seconds();
    if age_seconds <= 0 {
        return 1.0;
    }
    let window_seconds = window_days as f64 * 86_400.0;
    (1.0 - age_seconds as f64 / window_seconds).clamp(0.0, 1.0)
}

/// Weighted sum of the three components, clamped to [0, 1].
pub fn compute_combined_score(skill: f64, relevance: f64, recency: f64, weights: &MatchWeights) -> f64 {
    (weights.skill * skill + weights.relevance * relevance + weights.recency * recency)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skill_score_fraction() {
        let score = compute_skill_score(&set(&["python", "sql"]), Some(&set(&["python"])));
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skill_score_neutral_without_candidate() {
        assert_eq!(compute_skill_score(&set(&["rust"]), None), NEUTRAL_SKILL_SCORE);
    }

    #[test]
    fn test_skill_score_neutral_for_empty_candidate_skills() {
        assert_eq!(
            compute_skill_score(&set(&["rust"]), Some(&BTreeSet::new())),
            NEUTRAL_SKILL_SCORE
        );
    }

    #[test]
    fn test_skill_score_neutral_without_requirements() {
        assert_eq!(
            compute_skill_score(&BTreeSet::new(), Some(&set(&["rust"]))),
            NEUTRAL_SKILL_SCORE
        );
    }

    #[test]
    fn test_relevance_full_title_match() {
        let terms = content_terms("software engineer");
        let score = compute_relevance(&terms, "Senior Software Engineer", "");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recency_fresh_is_one() {
        let now = Utc::now();
        assert_eq!(compute_recency_score(now, now, 180), 1.0);
    }

    #[test]
    fn test_recency_future_is_one() {
        let now = Utc::now();
        assert_eq!(compute_recency_score(now + Duration::days(3), now, 180), 1.0);
    }

    #[test]
    fn test_recency_halfway() {
        let now = Utc::now();
        let score = compute_recency_score(now - Duration::days(90), now, 180);
        assert!((score - 0.5).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_recency_stale_is_zero() {
        let now = Utc::now();
        assert_eq!(compute_recency_score(now - Duration::days(400), now, 180), 0.0);
    }

    #[test]
    fn test_recency_huge_window_does_not_overflow() {
        let now = Utc::now();
        let score = compute_recency_score(now - Duration::days(365), now, i64::MAX);
        assert!(score > 0.99 && score <= 1.0);
    }

    #[test]
    fn test_combined_score_full() {
        let w = MatchWeights::default();
        let score = compute_combined_score(1.0, 1.0, 1.0, &w);
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combined_score_partial() {
        let w = MatchWeights::default();
        // 0.5*0.5 + 0.3*1.0 + 0.2*1.0 = 0.75
        let score = compute_combined_score(0.5, 1.0, 1.0, &w);
        assert!((score - 0.75).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_combined_score_clamped() {
        let w = MatchWeights {
            skill: 1.0,
            relevance: 1.0,
            recency: 0.0,
        };
        assert_eq!(compute_combined_score(1.0, 1.0, 0.0, &w), 1.0);
    }
}
