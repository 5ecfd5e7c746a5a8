//! Skill vocabulary — the closed set of skills that extraction may produce.
//!
//! Each skill has a canonical name and optional aliases. Matching is done on
//! token sequences, so multi-word phrases ("machine learning") and
//! punctuated names ("ci/cd", "node.js") behave the same way.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::text::{contains_phrase, normalize_skill, tokenize};

/// One vocabulary entry as written in a vocabulary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub skill: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Vocabulary files may list bare names or full entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VocabularyItem {
    Name(String),
    Entry(VocabularyEntry),
}

/// A skill found in a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRequirement {
    pub skill: String,
    pub frequency: u32,
    /// Token index of the first mention.
    pub first_position: usize,
}

#[derive(Debug, Clone)]
struct SkillTerm {
    skill: String,
    phrases: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    terms: Vec<SkillTerm>,
    /// Space-joined phrase tokens to index in `terms`.
    lookup: HashMap<String, usize>,
}

const DEFAULT_SKILLS: &[(&str, &[&str])] = &[
    ("python", &[]),
    ("java", &[]),
    ("javascript", &["js"]),
    ("typescript", &["ts"]),
    ("rust", &[]),
    ("golang", &[]),
    ("c++", &["cpp"]),
    ("c#", &["csharp"]),
    ("ruby", &[]),
    ("php", &[]),
    ("scala", &[]),
    ("kotlin", &[]),
    ("swift", &[]),
    ("sql", &[]),
    ("postgresql", &["postgres"]),
    ("mysql", &[]),
    ("mongodb", &["mongo"]),
    ("redis", &[]),
    ("elasticsearch", &[]),
    ("kafka", &["apache kafka"]),
    ("spark", &["apache spark"]),
    ("airflow", &["apache airflow"]),
    ("aws", &["amazon web services"]),
    ("gcp", &["google cloud", "google cloud platform"]),
    ("azure", &["microsoft azure"]),
    ("docker", &[]),
    ("kubernetes", &["k8s"]),
    ("terraform", &[]),
    ("ansible", &[]),
    ("linux", &[]),
    ("git", &[]),
    ("ci/cd", &["continuous integration", "continuous delivery"]),
    ("devops", &[]),
    ("react", &["react.js", "reactjs"]),
    ("angular", &[]),
    ("vue", &["vue.js", "vuejs"]),
    ("node.js", &["nodejs"]),
    ("django", &[]),
    ("flask", &[]),
    ("spring boot", &[]),
    ("graphql", &[]),
    ("rest api", &["restful", "rest apis"]),
    ("microservices", &[]),
    ("distributed systems", &[]),
    ("machine learning", &["ml"]),
    ("deep learning", &[]),
    ("pytorch", &[]),
    ("tensorflow", &[]),
    ("pandas", &[]),
    ("numpy", &[]),
    ("nlp", &["natural language processing"]),
    ("data analysis", &[]),
    ("tableau", &[]),
    ("excel", &[]),
    ("html", &[]),
    ("css", &[]),
    ("figma", &[]),
    ("agile", &[]),
    ("scrum", &[]),
    ("project management", &[]),
    ("product management", &[]),
];

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS.iter().map(|(skill, aliases)| VocabularyEntry {
            skill: skill.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }))
    }
}

impl SkillVocabulary {
    /// Builds a vocabulary. Later entries never override an earlier phrase.
    pub fn new(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let mut terms: Vec<SkillTerm> = Vec::new();
        let mut lookup = HashMap::new();

        for entry in entries {
            let skill = normalize_skill(&entry.skill);
            if skill.is_empty() {
                continue;
            }
            let index = terms.len();
            let mut phrases = Vec::new();

            for raw in std::iter::once(&entry.skill).chain(entry.aliases.iter()) {
                let phrase = tokenize(raw);
                if phrase.is_empty() {
                    continue;
                }
                let key = phrase.join(" ");
                if lookup.contains_key(&key) {
                    continue;
                }
                lookup.insert(key, index);
                phrases.push(phrase);
            }

            if !phrases.is_empty() {
                terms.push(SkillTerm { skill, phrases });
            }
        }

        Self { terms, lookup }
    }

    /// Parses a JSON array of skill names and/or `{skill, aliases}` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let items: Vec<VocabularyItem> =
            serde_json::from_str(json).context("Skill vocabulary must be a JSON array")?;
        Ok(Self::new(items.into_iter().map(|item| match item {
            VocabularyItem::Name(skill) => VocabularyEntry {
                skill,
                aliases: Vec::new(),
            },
            VocabularyItem::Entry(entry) => entry,
        })))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read skill vocabulary {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid skill vocabulary {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Known skills mentioned in `text`, most frequent first, then by first mention.
    pub fn extract(&self, text: &str) -> Vec<ExtractedRequirement> {
        let tokens = tokenize(text);
        let mut found = Vec::new();

        for term in &self.terms {
            // An alias overlapping another phrasing at the same spot counts once.
            let mut positions = BTreeSet::new();
            for phrase in &term.phrases {
                for (position, window) in tokens.windows(phrase.len()).enumerate() {
                    if window == phrase.as_slice() {
                        positions.insert(position);
                    }
                }
            }

            if let Some(&first_position) = positions.first() {
                found.push(ExtractedRequirement {
                    skill: term.skill.clone(),
                    frequency: positions.len() as u32,
                    first_position,
                });
            }
        }

        found.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.first_position.cmp(&b.first_position))
                .then_with(|| a.skill.cmp(&b.skill))
        });
        found
    }

    /// Maps an alias or differently-cased name to its canonical skill.
    /// Names outside the vocabulary are returned in normalized form.
    pub fn canonicalize(&self, skill: &str) -> String {
        let key = tokenize(skill).join(" ");
        match self.lookup.get(&key) {
            Some(&index) => self.terms[index].skill.clone(),
            None => normalize_skill(skill),
        }
    }

    /// True when `tokens` mention `skill` under any of its known phrasings.
    pub fn mentions(&self, tokens: &[String], skill: &str) -> bool {
        let key = tokenize(skill);
        match self.lookup.get(&key.join(" ")) {
            Some(&index) => self.terms[index]
                .phrases
                .iter()
                .any(|phrase| contains_phrase(tokens, phrase)),
            None => contains_phrase(tokens, &key),
        }
    }
}
