//! Resume Tailoring — scores a resume against a job description and proposes
//! section rewrites that surface the candidate's relevant skills.
//!
//! Algorithm:
//! 1. Extract requirements from the JD against the skill vocabulary
//! 2. match_score = |requirements ∩ resume skills| / |requirements|
//! 3. Tailor sections that reference a requirement but omit a relevant skill;
//!    omit the rest
//! 4. Recommendations: missing-skill call-outs → gap sentences →
//!    "demonstrate" hints → at most one summary rewrite
//!
//! Deterministic: identical inputs always produce identical output.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::MatchError;
use crate::models::CandidateProfile;
use crate::tailoring::vocabulary::SkillVocabulary;
use crate::text::tokenize;

const SUMMARY_SECTION: &str = "summary";
const SKILLS_SECTION: &str = "skills";

/// Result of tailoring one resume to one job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    pub base_resume: BTreeMap<String, String>,
    pub job_description: String,
    /// Only sections with an actionable change; callers merge with `base_resume`.
    pub tailored_sections: BTreeMap<String, String>,
    pub match_score: f64,
    pub recommendations: Vec<String>,
    /// Extracted requirements, highest priority first.
    pub requirements: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Tailors `resume` to `job_description`.
///
/// Fails with `EmptyJobDescription` on a blank description and `EmptyResume`
/// when the resume has no non-blank section. Validation runs before any work.
pub fn tailor(
    job_description: &str,
    resume: &CandidateProfile,
    vocabulary: &SkillVocabulary,
) -> Result<TailoredResume, MatchError> {
    if job_description.trim().is_empty() {
        return Err(MatchError::EmptyJobDescription);
    }
    if !resume.has_resume_content() {
        return Err(MatchError::EmptyResume);
    }

    let requirements: Vec<String> = vocabulary
        .extract(job_description)
        .into_iter()
        .map(|r| r.skill)
        .collect();

    let resume_skills: BTreeSet<String> = resume
        .skills
        .iter()
        .map(|s| vocabulary.canonicalize(s))
        .filter(|s| !s.is_empty())
        .collect();

    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = requirements
        .iter()
        .cloned()
        .partition(|r| resume_skills.contains(r));

    let match_score = if requirements.is_empty() {
        0.0
    } else {
        (matched_skills.len() as f64 / requirements.len() as f64).clamp(0.0, 1.0)
    };

    let section_tokens: BTreeMap<&str, Vec<String>> = resume
        .resume_sections
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(name, text)| (name.as_str(), tokenize(text)))
        .collect();

    let tailored_sections = tailor_sections(
        resume,
        &section_tokens,
        &requirements,
        &matched_skills,
        vocabulary,
    );

    let recommendations = build_recommendations(
        &requirements,
        &matched_skills,
        &missing_skills,
        &section_tokens,
        vocabulary,
    );

    debug!(
        requirements = requirements.len(),
        matched = matched_skills.len(),
        tailored = tailored_sections.len(),
        match_score,
        "Tailoring complete"
    );

    Ok(TailoredResume {
        base_resume: resume.resume_sections.clone(),
        job_description: job_description.to_string(),
        tailored_sections,
        match_score,
        recommendations,
        requirements,
        matched_skills,
        missing_skills,
    })
}

/// Rewrites sections that reference a requirement but leave out a relevant
/// skill, and adds a single "summary" override when the resume has no summary.
fn tailor_sections(
    resume: &CandidateProfile,
    section_tokens: &BTreeMap<&str, Vec<String>>,
    requirements: &[String],
    relevant: &[String],
    vocabulary: &SkillVocabulary,
) -> BTreeMap<String, String> {
    let mut tailored = BTreeMap::new();
    if relevant.is_empty() {
        return tailored;
    }

    for (name, tokens) in section_tokens {
        let is_summary = name.eq_ignore_ascii_case(SUMMARY_SECTION);
        let references_requirement = requirements
            .iter()
            .any(|r| vocabulary.mentions(tokens, r));
        if !is_summary && !references_requirement {
            continue;
        }

        let unmentioned: Vec<&str> = relevant
            .iter()
            .filter(|skill| !vocabulary.mentions(tokens, skill))
            .map(String::as_str)
            .collect();
        if unmentioned.is_empty() {
            continue;
        }

        let original = resume.resume_sections[*name].trim();
        tailored.insert(name.to_string(), surface_skills(name, &unmentioned, original));
    }

    let has_summary = resume
        .resume_sections
        .keys()
        .any(|k| k.eq_ignore_ascii_case(SUMMARY_SECTION));
    if !has_summary {
        let skills: Vec<&str> = relevant.iter().map(String::as_str).collect();
        tailored.insert(
            SUMMARY_SECTION.to_string(),
            format!("Professional experienced in {}.", human_list(&skills)),
        );
    }

    tailored
}

/// Prepends a sentence naming `skills` to the section text.
fn surface_skills(section: &str, skills: &[&str], original: &str) -> String {
    let list = human_list(skills);
    let lead = match section.to_lowercase().as_str() {
        SUMMARY_SECTION => format!("Experienced in {list}."),
        SKILLS_SECTION => format!("Core skills: {list}."),
        _ => format!("Relevant skills: {list}."),
    };
    format!("{lead} {original}")
}

fn build_recommendations(
    requirements: &[String],
    matched: &[String],
    missing: &[String],
    section_tokens: &BTreeMap<&str, Vec<String>>,
    vocabulary: &SkillVocabulary,
) -> Vec<String> {
    if requirements.is_empty() {
        return vec![
            "No recognizable skill requirements found in the job description; nothing to tailor."
                .to_string(),
        ];
    }

    let mut recommendations = Vec::new();

    for skill in missing {
        recommendations.push(format!(
            "Missing skill: {skill} is requested by the job description but not listed in your skills."
        ));
    }

    for skill in missing {
        recommendations.push(format!(
            "If you have worked with {skill}, add a sentence showing it, e.g. \"Delivered <result> using {skill}.\""
        ));
    }

    for skill in matched {
        let shown = section_tokens
            .values()
            .any(|tokens| vocabulary.mentions(tokens, skill));
        if !shown {
            recommendations.push(format!(
                "Demonstrate {skill} in your experience section; it is listed in your skills but never shown in context."
            ));
        }
    }

    if let Some(top) = requirements.first() {
        if missing.contains(top) {
            recommendations.push(format!(
                "Rewrite your summary to address {top}, the most emphasized requirement for this role."
            ));
        }
    }

    recommendations
}

/// "a", "a and b", "a, b and c".
fn human_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
