use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::tokenize;

/// Seniority band used by the `experience_level` search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "junior" => Some(ExperienceLevel::Junior),
            "mid" => Some(ExperienceLevel::Mid),
            "senior" => Some(ExperienceLevel::Senior),
            _ => None,
        }
    }

    /// Best-effort level from a job title. Titles without a marker are mid-level.
    pub fn infer_from_title(title: &str) -> Self {
        let tokens = tokenize(title);
        let has = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));

        if has(&["senior", "sr", "lead", "principal", "staff"]) {
            ExperienceLevel::Senior
        } else if has(&["junior", "jr", "intern", "entry", "graduate"]) {
            ExperienceLevel::Junior
        } else {
            ExperienceLevel::Mid
        }
    }
}

/// Advertised pay band, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }

    /// True when the whole band lies inside `[lower, upper]`. A missing bound
    /// is unbounded on that side.
    pub fn is_within(&self, lower: Option<f64>, upper: Option<f64>) -> bool {
        lower.map_or(true, |lo| self.min >= lo) && upper.map_or(true, |hi| self.max <= hi)
    }
}

/// A job posting as supplied by the posting source. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub salary_range: Option<SalaryRange>,
    #[serde(default)]
    pub remote: bool,
    pub posted_at: DateTime<Utc>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
}

impl JobPosting {
    /// Declared level, or one inferred from the title when the source omits it.
    pub fn effective_experience_level(&self) -> ExperienceLevel {
        self.experience_level
            .unwrap_or_else(|| ExperienceLevel::infer_from_title(&self.title))
    }

    /// Returns why this posting cannot be scored, if anything.
    pub fn malformation(&self) -> Option<&'static str> {
        if self.id.trim().is_empty() {
            return Some("empty id");
        }
        match self.salary_range {
            Some(range) if !range.is_well_formed() => Some("invalid salary range"),
            _ => None,
        }
    }
}
