//! Matching Engine — filters, scores and ranks job postings for a `SearchSpec`.
//!
//! Algorithm:
//! 1. Drop malformed postings (counted in `skipped`)
//! 2. Keep postings satisfying every known filter and the location constraint
//! 3. score = w.skill × skill + w.relevance × relevance + w.recency × recency
//! 4. Sort by score desc, then `posted_at` desc, then `id` asc
//!
//! Pure and synchronous. Batch searches fan out over rayon.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MatchError;
use crate::matching::query::SearchSpec;
use crate::matching::scoring::{
    compute_combined_score, compute_recency_score, compute_relevance, compute_skill_score,
    MatchConfig,
};
use crate::models::{CandidateProfile, JobPosting};
use crate::text::{content_terms, normalize_skill};

/// A posting scored against one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobPosting,
    pub score: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
}

/// Ranked results plus the number of postings excluded as malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<MatchResult>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Ranks `postings` for `spec`, measuring recency against the current time.
    ///
    /// `postings: None` means no source was wired up and fails with
    /// `NoPostingsSource`; an empty slice is a normal, empty search.
    pub fn search(
        &self,
        spec: &SearchSpec,
        candidate: Option<&CandidateProfile>,
        postings: Option<&[JobPosting]>,
    ) -> Result<SearchOutcome, MatchError> {
        self.search_at(spec, candidate, postings, Utc::now())
    }

    /// Same as [`search`](Self::search) with an explicit reference time.
    pub fn search_at(
        &self,
        spec: &SearchSpec,
        candidate: Option<&CandidateProfile>,
        postings: Option<&[JobPosting]>,
        now: DateTime<Utc>,
    ) -> Result<SearchOutcome, MatchError> {
        let postings = postings.ok_or(MatchError::NoPostingsSource)?;

        let candidate_skills = candidate.map(CandidateProfile::normalized_skills);
        let query_terms = content_terms(spec.query());

        let mut seen_ids = HashSet::new();
        let mut skipped = 0usize;
        let mut results = Vec::new();

        for posting in postings {
            if let Some(reason) = posting.malformation() {
                warn!(posting_id = %posting.id, "Skipping posting: {reason}");
                skipped += 1;
                continue;
            }
            if !seen_ids.insert(posting.id.as_str()) {
                warn!(posting_id = %posting.id, "Skipping posting: duplicate id");
                skipped += 1;
                continue;
            }
            if !passes_filters(spec, posting) {
                debug!(posting_id = %posting.id, "Posting filtered out");
                continue;
            }

            let required: BTreeSet<String> = posting
                .required_skills
                .iter()
                .map(|s| normalize_skill(s))
                .filter(|s| !s.is_empty())
                .collect();

            let skill = compute_skill_score(&required, candidate_skills.as_ref());
            let relevance = compute_relevance(&query_terms, &posting.title, &posting.description);
            let recency = compute_recency_score(
                posting.posted_at,
                now,
                self.config.staleness_window_days,
            );
            let score = compute_combined_score(skill, relevance, recency, &self.config.weights);

            let (matched_skills, missing_skills) = match &candidate_skills {
                Some(skills) => (
                    required.intersection(skills).cloned().collect(),
                    required.difference(skills).cloned().collect(),
                ),
                None => (BTreeSet::new(), required),
            };

            results.push(MatchResult {
                job: posting.clone(),
                score,
                matched_skills,
                missing_skills,
            });
        }

        results.sort_by(rank_order);

        debug!(
            query = spec.query(),
            results = results.len(),
            skipped,
            "Search complete"
        );

        Ok(SearchOutcome { results, skipped })
    }

    /// Runs one independent search per spec over the shared postings.
    /// Output order matches `specs`.
    pub fn search_batch(
        &self,
        specs: &[SearchSpec],
        candidate: Option<&CandidateProfile>,
        postings: Option<&[JobPosting]>,
    ) -> Vec<Result<SearchOutcome, MatchError>> {
        let now = Utc::now();
        specs
            .par_iter()
            .map(|spec| self.search_at(spec, candidate, postings, now))
            .collect()
    }
}

/// Score desc, then newer first, then id asc.
fn rank_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.job.posted_at.cmp(&a.job.posted_at))
        .then_with(|| a.job.id.cmp(&b.job.id))
}

fn passes_filters(spec: &SearchSpec, posting: &JobPosting) -> bool {
    let filters = spec.filters();

    if let Some(remote) = filters.remote {
        if posting.remote != remote {
            return false;
        }
    }

    if let Some(level) = filters.experience_level {
        if posting.effective_experience_level() != level {
            return false;
        }
    }

    if filters.has_salary_bounds() {
        match posting.salary_range {
            Some(range) if range.is_within(filters.min_salary, filters.max_salary) => {}
            _ => return false,
        }
    }

    match spec.location() {
        Some(location) => posting.remote || location_matches(&posting.location, location),
        None => true,
    }
}

/// Case-insensitive substring match of the requested location.
fn location_matches(posting_location: &str, requested: &str) -> bool {
    posting_location
        .to_lowercase()
        .contains(&requested.to_lowercase())
}
