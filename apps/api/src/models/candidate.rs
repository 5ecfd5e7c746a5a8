use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::text::normalize_skill;

/// Candidate data supplied by the caller for a single search or tailoring call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub experience_years: f64,
    #[serde(default)]
    pub preferred_locations: BTreeSet<String>,
    /// Section name (e.g. "summary", "experience", "skills") to section text.
    #[serde(default)]
    pub resume_sections: BTreeMap<String, String>,
}

impl CandidateProfile {
    /// Skills in canonical (trimmed, lowercase) form, blanks dropped.
    pub fn normalized_skills(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .map(|s| normalize_skill(s))
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn has_resume_content(&self) -> bool {
        self.resume_sections.values().any(|t| !t.trim().is_empty())
    }
}
