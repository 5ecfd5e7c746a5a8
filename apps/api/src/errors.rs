use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Input-validation failures raised by the matching and tailoring engines.
/// Every variant names the offending field via [`MatchError::field`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("query must not be empty")]
    InvalidQuery,

    #[error("invalid filter '{key}': {reason}")]
    InvalidFilter { key: String, reason: String },

    #[error("no job posting source is configured")]
    NoPostingsSource,

    #[error("job_description must not be empty")]
    EmptyJobDescription,

    #[error("resume must contain at least one non-empty section")]
    EmptyResume,
}

impl MatchError {
    pub fn invalid_filter(key: &str, reason: impl Into<String>) -> Self {
        MatchError::InvalidFilter {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the request field that caused the failure.
    pub fn field(&self) -> &str {
        match self {
            MatchError::InvalidQuery => "query",
            MatchError::InvalidFilter { key, .. } => key,
            MatchError::NoPostingsSource => "postings",
            MatchError::EmptyJobDescription => "job_description",
            MatchError::EmptyResume => "resume.resume_sections",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::InvalidQuery => "INVALID_QUERY",
            MatchError::InvalidFilter { .. } => "INVALID_FILTER",
            MatchError::NoPostingsSource => "NO_POSTINGS_SOURCE",
            MatchError::EmptyJobDescription => "EMPTY_JOB_DESCRIPTION",
            MatchError::EmptyResume => "EMPTY_RESUME",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Matching(#[from] MatchError),

    #[error("Posting source error: {0}")]
    PostingSource(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Matching(e) => {
                let status = match e {
                    MatchError::NoPostingsSource => {
                        tracing::error!("Search requested without a posting source");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.code(), e.to_string(), Some(e.field().to_string()))
            }
            AppError::PostingSource(msg) => {
                tracing::error!("Posting source error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "POSTING_SOURCE_ERROR",
                    "The job posting source could not be read".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
