//! Query Normalizer — turns a raw search request into a validated `SearchSpec`.
//!
//! Pure transformation. Known filter keys are type-coerced; unknown keys are
//! kept verbatim and reported back as warnings instead of being rejected.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::MatchError;
use crate::models::ExperienceLevel;
use crate::text::collapse_whitespace;

const REMOTE: &str = "remote";
const EXPERIENCE_LEVEL: &str = "experience_level";
const MIN_SALARY: &str = "min_salary";
const MAX_SALARY: &str = "max_salary";

/// Typed search constraints. Unknown keys travel in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SearchFilters {
    pub fn has_salary_bounds(&self) -> bool {
        self.min_salary.is_some() || self.max_salary.is_some()
    }
}

/// Normalized, validated job-search query. Only constructible through [`normalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSpec {
    query: String,
    location: Option<String>,
    filters: SearchFilters,
}

impl SearchSpec {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }
}

/// A `SearchSpec` plus any non-fatal findings for the caller to surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuery {
    pub spec: SearchSpec,
    pub warnings: Vec<String>,
}

/// Builds a `SearchSpec` from raw request input.
///
/// Fails with `InvalidQuery` on a blank query and `InvalidFilter` when a known
/// filter cannot be coerced to its type.
pub fn normalize(
    query: &str,
    location: Option<&str>,
    filters: Option<&Map<String, Value>>,
) -> Result<NormalizedQuery, MatchError> {
    let query = collapse_whitespace(query);
    if query.is_empty() {
        return Err(MatchError::InvalidQuery);
    }

    let location = location
        .map(collapse_whitespace)
        .filter(|l| !l.is_empty());

    let mut parsed = SearchFilters::default();
    let mut warnings = Vec::new();

    for (key, value) in filters.into_iter().flatten() {
        // null on a known key means "not set"
        if value.is_null() && is_known_key(key) {
            continue;
        }
        match key.as_str() {
            REMOTE => parsed.remote = Some(coerce_bool(key, value)?),
            EXPERIENCE_LEVEL => parsed.experience_level = Some(coerce_level(key, value)?),
            MIN_SALARY => parsed.min_salary = Some(coerce_amount(key, value)?),
            MAX_SALARY => parsed.max_salary = Some(coerce_amount(key, value)?),
            _ => {
                warnings.push(format!("unknown filter '{key}' preserved but not applied"));
                parsed.extra.insert(key.clone(), value.clone());
            }
        }
    }

    if let (Some(min), Some(max)) = (parsed.min_salary, parsed.max_salary) {
        if min > max {
            return Err(MatchError::invalid_filter(
                MIN_SALARY,
                format!("min_salary ({min}) exceeds max_salary ({max})"),
            ));
        }
    }

    Ok(NormalizedQuery {
        spec: SearchSpec {
            query,
            location,
            filters: parsed,
        },
        warnings,
    })
}

fn is_known_key(key: &str) -> bool {
    matches!(key, REMOTE | EXPERIENCE_LEVEL | MIN_SALARY | MAX_SALARY)
}

fn coerce_bool(key: &str, value: &Value) -> Result<bool, MatchError> {
    let coerced = match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    };
    coerced.ok_or_else(|| MatchError::invalid_filter(key, format!("expected a boolean, got {value}")))
}

fn coerce_amount(key: &str, value: &Value) -> Result<f64, MatchError> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| MatchError::invalid_filter(key, format!("expected a number, got {value}")))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(MatchError::invalid_filter(
            key,
            format!("must be a non-negative number, got {amount}"),
        ));
    }
    Ok(amount)
}

fn coerce_level(key: &str, value: &Value) -> Result<ExperienceLevel, MatchError> {
    value
        .as_str()
        .and_then(ExperienceLevel::parse)
        .ok_or_else(|| {
            MatchError::invalid_filter(key, format!("expected junior, mid or senior, got {value}"))
        })
}
