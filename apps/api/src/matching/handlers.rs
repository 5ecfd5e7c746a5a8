//! Axum route handlers for the Job Search API.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::{AppError, MatchError};
use crate::matching::engine::{MatchResult, SearchOutcome};
use crate::matching::query::{normalize, NormalizedQuery, SearchFilters};
use crate::models::CandidateProfile;
use crate::postings::{fetch_with_timeout, PostingSnapshot};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    pub location: Option<String>,
    pub filters: Option<Map<String, Value>>,
    /// Caps returned results after ranking; `total_count` is unaffected.
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub search: SearchQuery,
    pub candidate: Option<CandidateProfile>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSearchRequest {
    pub searches: Vec<SearchQuery>,
    pub candidate: Option<CandidateProfile>,
}

/// Wire shape of one ranked posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResultView {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub score: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
}

impl From<&MatchResult> for MatchResultView {
    fn from(result: &MatchResult) -> Self {
        Self {
            id: result.job.id.clone(),
            title: result.job.title.clone(),
            company: result.job.company.clone(),
            location: result.job.location.clone(),
            score: result.score,
            matched_skills: result.matched_skills.clone(),
            missing_skills: result.missing_skills.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub location: Option<String>,
    pub filters: SearchFilters,
    pub results: Vec<MatchResultView>,
    pub total_count: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub field: String,
}

impl From<&MatchError> for ErrorBody {
    fn from(err: &MatchError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            field: err.field().to_string(),
        }
    }
}

/// One entry of a batch response: a full search envelope or that search's error.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchSearchItem {
    Ok(SearchResponse),
    Err { error: ErrorBody },
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /jobs/search
///
/// Normalizes the query (failing before any I/O), pulls postings from the
/// configured source, and returns ranked matches.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let SearchRequest { search, candidate } = request;
    let normalized = normalize(
        &search.query,
        search.location.as_deref(),
        search.filters.as_ref(),
    )?;
    for warning in &normalized.warnings {
        warn!("{warning}");
    }

    let snapshot = load_postings(&state).await?;
    let rejected = snapshot.as_ref().map_or(0, |s| s.rejected);

    // CPU-bound ranking runs off the async runtime.
    let engine = Arc::clone(&state.engine);
    let spec = normalized.spec.clone();
    let mut outcome = tokio::task::spawn_blocking(move || {
        engine.search(
            &spec,
            candidate.as_ref(),
            snapshot.as_ref().map(|s| s.postings.as_slice()),
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("search task failed: {e}")))??;
    outcome.skipped += rejected;

    info!(
        query = normalized.spec.query(),
        results = outcome.results.len(),
        skipped = outcome.skipped,
        "Job search served"
    );

    Ok(Json(build_response(normalized, outcome, search.limit)))
}

/// POST /jobs/search/batch
///
/// Runs several searches against one snapshot of postings. Each search
/// succeeds or fails on its own; a missing posting source fails the whole call.
pub async fn handle_search_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchSearchRequest>,
) -> Result<Json<Vec<BatchSearchItem>>, AppError> {
    if request.searches.is_empty() {
        return Err(AppError::Validation("searches cannot be empty".to_string()));
    }

    let normalized: Vec<Result<NormalizedQuery, MatchError>> = request
        .searches
        .iter()
        .map(|s| normalize(&s.query, s.location.as_deref(), s.filters.as_ref()))
        .collect();

    let snapshot = load_postings(&state)
        .await?
        .ok_or(MatchError::NoPostingsSource)?;
    let rejected = snapshot.rejected;

    let specs: Vec<_> = normalized
        .iter()
        .filter_map(|n| n.as_ref().ok().map(|n| n.spec.clone()))
        .collect();

    // CPU-bound ranking runs off the async runtime.
    let engine = Arc::clone(&state.engine);
    let candidate = request.candidate;
    let outcomes = tokio::task::spawn_blocking(move || {
        engine.search_batch(&specs, candidate.as_ref(), Some(snapshot.postings.as_slice()))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("batch search task failed: {e}")))?;

    let mut outcomes = outcomes.into_iter();
    let items = normalized
        .into_iter()
        .zip(request.searches)
        .map(|(normalized, search)| match normalized {
            Err(err) => BatchSearchItem::Err {
                error: ErrorBody::from(&err),
            },
            Ok(normalized) => match outcomes.next() {
                Some(Ok(mut outcome)) => {
                    outcome.skipped += rejected;
                    BatchSearchItem::Ok(build_response(normalized, outcome, search.limit))
                }
                Some(Err(err)) => BatchSearchItem::Err {
                    error: ErrorBody::from(&err),
                },
                None => BatchSearchItem::Err {
                    error: ErrorBody::from(&MatchError::NoPostingsSource),
                },
            },
        })
        .collect::<Vec<_>>();

    info!(searches = items.len(), "Batch job search served");

    Ok(Json(items))
}

/// Pulls a postings snapshot, or `None` when no source is configured.
async fn load_postings(state: &AppState) -> Result<Option<PostingSnapshot>, AppError> {
    let Some(source) = &state.postings else {
        return Ok(None);
    };
    let snapshot = fetch_with_timeout(source.as_ref(), state.config.postings_fetch_timeout)
        .await
        .map_err(|e| AppError::PostingSource(e.to_string()))?;
    if snapshot.rejected > 0 {
        warn!(
            rejected = snapshot.rejected,
            "Unreadable postings counted as skipped"
        );
    }
    Ok(Some(snapshot))
}

fn build_response(
    normalized: NormalizedQuery,
    outcome: SearchOutcome,
    limit: Option<usize>,
) -> SearchResponse {
    let total_count = outcome.results.len();
    let results = outcome
        .results
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(MatchResultView::from)
        .collect();

    SearchResponse {
        query: normalized.spec.query().to_string(),
        location: normalized.spec.location().map(str::to_string),
        filters: normalized.spec.filters().clone(),
        results,
        total_count,
        skipped: outcome.skipped,
        warnings: normalized.warnings,
        timestamp: Utc::now(),
    }
}
