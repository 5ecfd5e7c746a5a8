//! Job posting sources — the boundary to wherever postings actually live.
//!
//! The matching engine never fetches; handlers pull a snapshot through
//! `PostingSource` and pass it in. `AppState` holds an
//! `Option<Arc<dyn PostingSource>>`; `None` means nothing was wired up.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::JobPosting;

#[derive(Debug, Error)]
pub enum PostingSourceError {
    #[error("failed to read postings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("postings file {path} is not a JSON array: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("posting source did not respond within {0:?}")]
    Timeout(Duration),
}

/// One fetch worth of postings. `rejected` counts entries the source could
/// not turn into a `JobPosting`; they are reported as skipped, never raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingSnapshot {
    pub postings: Vec<JobPosting>,
    pub rejected: usize,
}

impl PostingSnapshot {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self {
            postings,
            rejected: 0,
        }
    }
}

/// Supplies the current set of job postings.
#[async_trait]
pub trait PostingSource: Send + Sync {
    async fn fetch(&self) -> Result<PostingSnapshot, PostingSourceError>;
}

/// Fixed, in-process posting set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostingSource {
    snapshot: Arc<PostingSnapshot>,
}

impl InMemoryPostingSource {
    pub fn new(postings: Vec<JobPosting>) -> Self {
        Self::from_snapshot(PostingSnapshot::new(postings))
    }

    /// Keeps the snapshot's rejected count so every search keeps reporting it.
    pub fn from_snapshot(snapshot: PostingSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

#[async_trait]
impl PostingSource for InMemoryPostingSource {
    async fn fetch(&self) -> Result<PostingSnapshot, PostingSourceError> {
        Ok(self.snapshot.as_ref().clone())
    }
}

/// Reads a JSON array of postings from disk on every fetch, so edits to the
/// file are picked up without a restart.
#[derive(Debug, Clone)]
pub struct JsonFilePostingSource {
    path: PathBuf,
}

impl JsonFilePostingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PostingSource for JsonFilePostingSource {
    async fn fetch(&self) -> Result<PostingSnapshot, PostingSourceError> {
        let path = self.path.display().to_string();
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| PostingSourceError::Io {
                path: path.clone(),
                source,
            })?;
        let entries: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|source| PostingSourceError::Parse {
                path: path.clone(),
                source,
            })?;

        let snapshot = parse_entries(entries);
        if snapshot.rejected > 0 {
            warn!(
                rejected = snapshot.rejected,
                "Skipped unreadable postings in {path}"
            );
        }
        debug!("Loaded {} postings from {path}", snapshot.postings.len());
        Ok(snapshot)
    }
}

/// Converts each array entry on its own so one bad posting cannot sink the rest.
fn parse_entries(entries: Vec<Value>) -> PostingSnapshot {
    let mut snapshot = PostingSnapshot::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<JobPosting>(entry) {
            Ok(posting) => snapshot.postings.push(posting),
            Err(e) => {
                debug!("Posting #{index} rejected: {e}");
                snapshot.rejected += 1;
            }
        }
    }
    snapshot
}

/// Fetches from `source`, giving up after `timeout`.
pub async fn fetch_with_timeout(
    source: &dyn PostingSource,
    timeout: Duration,
) -> Result<PostingSnapshot, PostingSourceError> {
    tokio::time::timeout(timeout, source.fetch())
        .await
        .map_err(|_| PostingSourceError::Timeout(timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    fn posting(id: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: String::new(),
            required_skills: Default::default(),
            salary_range: None,
            remote: true,
            posted_at: Utc::now(),
            experience_level: None,
        }
    }

    struct SlowSource;

    #[async_trait]
    impl PostingSource for SlowSource {
        async fn fetch(&self) -> Result<PostingSnapshot, PostingSourceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(PostingSnapshot::default())
        }
    }

    #[tokio::test]
    async fn test_in_memory_source_returns_postings() {
        let source = InMemoryPostingSource::new(vec![posting("a"), posting("b")]);
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.postings.len(), 2);
        assert_eq!(snapshot.rejected, 0);
    }

    #[tokio::test]
    async fn test_json_file_source_reads_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![posting("j1")]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let source = JsonFilePostingSource::new(file.path());
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.postings.len(), 1);
        assert_eq!(snapshot.postings[0].id, "j1");
        assert_eq!(snapshot.rejected, 0);
    }

    #[tokio::test]
    async fn test_json_file_source_counts_unreadable_entries() {
        let good = serde_json::to_value(posting("j1")).unwrap();
        let mut no_company = good.clone();
        no_company.as_object_mut().unwrap().remove("company");
        no_company["id"] = "j2".into();
        let mut bad_salary = good.clone();
        bad_salary["id"] = "j3".into();
        bad_salary["salary_range"] = serde_json::json!({ "min": "lots", "max": 10 });

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![good, no_company, bad_salary]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let snapshot = JsonFilePostingSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(snapshot.postings.len(), 1);
        assert_eq!(snapshot.postings[0].id, "j1");
        assert_eq!(snapshot.rejected, 2);
    }

    #[tokio::test]
    async fn test_in_memory_source_keeps_rejected_count() {
        let source = InMemoryPostingSource::from_snapshot(PostingSnapshot {
            postings: vec![posting("a")],
            rejected: 3,
        });
        assert_eq!(source.fetch().await.unwrap().rejected, 3);
    }

    #[tokio::test]
    async fn test_json_file_source_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"not\": \"an array\"}").unwrap();

        let source = JsonFilePostingSource::new(file.path());
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, PostingSourceError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let source = JsonFilePostingSource::new("/nonexistent/postings.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, PostingSourceError::Io { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_times_out() {
        let err = fetch_with_timeout(&SlowSource, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, PostingSourceError::Timeout(_)));
    }
}
