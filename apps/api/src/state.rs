use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::matching::engine::MatchingEngine;
use crate::postings::PostingSource;
use crate::tailoring::vocabulary::SkillVocabulary;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no posting source is configured; searches then fail fast.
    pub postings: Option<Arc<dyn PostingSource>>,
    pub engine: Arc<MatchingEngine>,
    pub vocabulary: Arc<SkillVocabulary>,
    pub started_at: Instant,
}
