use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::matching::scoring::DEFAULT_STALENESS_WINDOW_DAYS;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// JSON array of job postings. Without it, searches report no posting source.
    pub postings_path: Option<PathBuf>,
    /// Re-read the postings file on every search instead of once at startup.
    pub postings_hot_reload: bool,
    /// JSON skill vocabulary. Without it, the built-in vocabulary is used.
    pub skill_vocabulary_path: Option<PathBuf>,
    pub staleness_window_days: i64,
    pub postings_fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Split out so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let staleness_window_days = match lookup("STALENESS_WINDOW_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .context("STALENESS_WINDOW_DAYS must be a whole number of days")?,
            None => DEFAULT_STALENESS_WINDOW_DAYS,
        };
        if staleness_window_days <= 0 {
            bail!("STALENESS_WINDOW_DAYS must be greater than zero");
        }

        let timeout_ms = match lookup("POSTINGS_FETCH_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("POSTINGS_FETCH_TIMEOUT_MS must be a number of milliseconds")?,
            None => 5_000,
        };

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            postings_path: lookup("POSTINGS_PATH").map(PathBuf::from),
            postings_hot_reload: match lookup("POSTINGS_HOT_RELOAD") {
                Some(raw) => raw
                    .parse::<bool>()
                    .context("POSTINGS_HOT_RELOAD must be true or false")?,
                None => false,
            },
            skill_vocabulary_path: lookup("SKILL_VOCABULARY_PATH").map(PathBuf::from),
            staleness_window_days,
            postings_fetch_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
