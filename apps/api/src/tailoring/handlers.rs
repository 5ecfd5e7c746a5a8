//! Axum route handlers for the Resume Tailoring API.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::CandidateProfile;
use crate::state::AppState;
use crate::tailoring::tailor::tailor;

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resume: CandidateProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TailorResponse {
    pub tailored_sections: BTreeMap<String, String>,
    pub match_score: f64,
    pub recommendations: Vec<String>,
}

/// POST /resumes/tailor
///
/// Scores the resume against the job description and returns only the
/// sections worth changing, plus ordered recommendations.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    let tailored = tailor(&request.job_description, &request.resume, &state.vocabulary)?;

    info!(
        match_score = tailored.match_score,
        tailored_sections = tailored.tailored_sections.len(),
        recommendations = tailored.recommendations.len(),
        "Resume tailored"
    );

    Ok(Json(TailorResponse {
        tailored_sections: tailored.tailored_sections,
        match_score: tailored.match_score,
        recommendations: tailored.recommendations,
    }))
}
