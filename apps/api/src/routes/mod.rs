pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::matching::handlers as search;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/jobs/search", post(search::handle_search))
        .route("/jobs/search/batch", post(search::handle_search_batch))
        .route("/resumes/tailor", post(tailoring::handle_tailor));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api.clone())
        // Versioned aliases
        .nest("/api/v1", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::matching::engine::MatchingEngine;
    use crate::models::JobPosting;
    use crate::postings::{
        InMemoryPostingSource, JsonFilePostingSource, PostingSnapshot, PostingSource,
        PostingSourceError,
    };
    use crate::tailoring::vocabulary::SkillVocabulary;

    fn posting(id: &str, title: &str, required: &[&str]) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            description: "Build backend services".to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            salary_range: None,
            remote: false,
            posted_at: Utc::now(),
            experience_level: None,
        }
    }

    fn state_with(postings: Option<Arc<dyn PostingSource>>) -> AppState {
        AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            postings,
            engine: Arc::new(MatchingEngine::default()),
            vocabulary: Arc::new(SkillVocabulary::default()),
            started_at: Instant::now(),
        }
    }

    fn default_state() -> AppState {
        state_with(Some(Arc::new(InMemoryPostingSource::new(vec![
            posting("j1", "Senior Software Engineer", &["python", "sql"]),
            posting("j2", "Office Manager", &[]),
        ]))))
    }

    async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl PostingSource for FailingSource {
        async fn fetch(&self) -> Result<PostingSnapshot, PostingSourceError> {
            Err(PostingSourceError::Timeout(Duration::from_millis(1)))
        }
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = build_router(default_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobmatch");
    }

    #[tokio::test]
    async fn test_search_returns_ranked_results() {
        let (status, body) = post_json(
            default_state(),
            "/jobs/search",
            json!({
                "query": "software engineer",
                "candidate": { "skills": ["python"] }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["skipped"], 0);
        let first = &body["results"][0];
        assert_eq!(first["id"], "j1");
        assert_eq!(first["matched_skills"], json!(["python"]));
        assert_eq!(first["missing_skills"], json!(["sql"]));
        assert!(first.get("description").is_none());
    }

    #[tokio::test]
    async fn test_search_limit_keeps_total_count() {
        let (status, body) = post_json(
            default_state(),
            "/api/v1/jobs/search",
            json!({ "query": "engineer", "limit": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["total_count"], 2);
    }

    #[tokio::test]
    async fn test_search_surfaces_unknown_filter_warning() {
        let (status, body) = post_json(
            default_state(),
            "/jobs/search",
            json!({ "query": "engineer", "filters": { "visa": true } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["visa"], true);
        assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_blank_query_is_bad_request() {
        let (status, body) = post_json(default_state(), "/jobs/search", json!({ "query": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_QUERY");
        assert_eq!(body["error"]["field"], "query");
    }

    #[tokio::test]
    async fn test_search_bad_filter_names_field() {
        let (status, body) = post_json(
            default_state(),
            "/jobs/search",
            json!({ "query": "engineer", "filters": { "min_salary": "lots" } }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "min_salary");
    }

    #[tokio::test]
    async fn test_search_without_source_is_unavailable() {
        let (status, body) =
            post_json(state_with(None), "/jobs/search", json!({ "query": "engineer" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "NO_POSTINGS_SOURCE");
    }

    #[tokio::test]
    async fn test_search_source_failure_is_bad_gateway() {
        let (status, body) = post_json(
            state_with(Some(Arc::new(FailingSource))),
            "/jobs/search",
            json!({ "query": "engineer" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "POSTING_SOURCE_ERROR");
    }

    #[tokio::test]
    async fn test_search_counts_unreadable_file_entries_as_skipped() {
        use std::io::Write;

        let good = serde_json::to_value(posting("j1", "Backend Engineer", &["rust"])).unwrap();
        let mut no_company = good.clone();
        no_company.as_object_mut().unwrap().remove("company");
        no_company["id"] = json!("j2");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let contents = json!([good, no_company]).to_string();
        file.write_all(contents.as_bytes()).unwrap();

        let state = state_with(Some(Arc::new(JsonFilePostingSource::new(file.path()))));
        let (status, body) =
            post_json(state, "/jobs/search", json!({ "query": "backend engineer" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["results"][0]["id"], "j1");
        assert_eq!(body["skipped"], 1);
    }

    #[tokio::test]
    async fn test_batch_search_adds_rejected_entries_to_skipped() {
        let source = InMemoryPostingSource::from_snapshot(PostingSnapshot {
            postings: vec![posting("j1", "Backend Engineer", &[])],
            rejected: 2,
        });
        let (status, body) = post_json(
            state_with(Some(Arc::new(source))),
            "/jobs/search/batch",
            json!({ "searches": [{ "query": "engineer" }] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["skipped"], 2);
        assert_eq!(body[0]["total_count"], 1);
    }

    #[tokio::test]
    async fn test_batch_search_mixes_results_and_errors() {
        let (status, body) = post_json(
            default_state(),
            "/jobs/search/batch",
            json!({
                "searches": [
                    { "query": "office manager" },
                    { "query": "" },
                    { "query": "software engineer" }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["results"][0]["id"], "j2");
        assert_eq!(items[1]["error"]["code"], "INVALID_QUERY");
        assert_eq!(items[2]["results"][0]["id"], "j1");
    }

    #[tokio::test]
    async fn test_batch_search_requires_searches() {
        let (status, _) =
            post_json(default_state(), "/jobs/search/batch", json!({ "searches": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tailor_returns_score_and_recommendations() {
        let (status, body) = post_json(
            default_state(),
            "/resumes/tailor",
            json!({
                "job_description": "Requires Python and AWS experience",
                "resume": {
                    "skills": ["python"],
                    "resume_sections": { "experience": "Python ETL jobs." }
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!((body["match_score"].as_f64().unwrap() - 0.5).abs() < 1e-9);
        let recommendations = body["recommendations"].as_array().unwrap();
        assert!(recommendations
            .iter()
            .any(|r| r.as_str().unwrap().contains("aws")));
        assert!(body["tailored_sections"].is_object());
    }

    #[tokio::test]
    async fn test_tailor_empty_description_names_field() {
        let (status, body) = post_json(
            default_state(),
            "/resumes/tailor",
            json!({
                "job_description": "",
                "resume": { "resume_sections": { "summary": "Engineer" } }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_JOB_DESCRIPTION");
        assert_eq!(body["error"]["field"], "job_description");
    }

    #[tokio::test]
    async fn test_tailor_empty_resume_is_rejected() {
        let (status, body) = post_json(
            default_state(),
            "/api/v1/resumes/tailor",
            json!({ "job_description": "Python developer", "resume": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_RESUME");
    }
}
