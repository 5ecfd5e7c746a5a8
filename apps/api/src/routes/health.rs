use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a status object with service version and uptime.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobmatch",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now(),
    }))
}
