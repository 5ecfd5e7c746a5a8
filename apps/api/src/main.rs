mod config;
mod errors;
mod matching;
mod models;
mod postings;
mod routes;
mod state;
mod tailoring;
mod text;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::matching::engine::MatchingEngine;
use crate::matching::scoring::MatchConfig;
use crate::postings::{InMemoryPostingSource, JsonFilePostingSource, PostingSource};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::vocabulary::SkillVocabulary;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Skill vocabulary for resume tailoring
    let vocabulary = match &config.skill_vocabulary_path {
        Some(path) => SkillVocabulary::load(path)?,
        None => SkillVocabulary::default(),
    };
    if vocabulary.is_empty() {
        warn!("Skill vocabulary is empty; tailoring will find no requirements");
    }
    info!("Skill vocabulary loaded ({} skills)", vocabulary.len());

    // Job posting source
    let postings: Option<Arc<dyn PostingSource>> = match &config.postings_path {
        Some(path) if config.postings_hot_reload => {
            info!("Reading job postings from {} on every search", path.display());
            Some(Arc::new(JsonFilePostingSource::new(path.clone())))
        }
        Some(path) => {
            let snapshot = JsonFilePostingSource::new(path.clone()).fetch().await?;
            info!(
                "Loaded {} job postings from {} ({} unreadable)",
                snapshot.postings.len(),
                path.display(),
                snapshot.rejected
            );
            Some(Arc::new(InMemoryPostingSource::from_snapshot(snapshot)))
        }
        None => {
            warn!("POSTINGS_PATH is not set; job search requests will fail");
            None
        }
    };

    let engine = MatchingEngine::new(MatchConfig {
        staleness_window_days: config.staleness_window_days,
        ..MatchConfig::default()
    });
    info!(
        "Matching engine configured (staleness window: {} days)",
        engine.config().staleness_window_days
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        postings,
        engine: Arc::new(engine),
        vocabulary: Arc::new(vocabulary),
        started_at: Instant::now(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
