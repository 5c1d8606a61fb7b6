//! Question-case mapping table loading and validation
//!
//! The table maps opaque identifiers to canonical question strings, with an
//! optional assertion constraint to disambiguate entries that share the same
//! question text. Loading is best-effort: an absent, unreadable, or malformed
//! table degrades to an empty map and every case falls through to the
//! fallback ID generator. Nothing here is allowed to abort report generation.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// One row of the mapping table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingEntry {
    pub question: Option<String>,
    pub assertion: Option<MapAssertion>,
}

/// Expected assertion attached to a mapping entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapAssertion {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<Value>,
}

/// Identifier-to-entry table, kept in document order so that first-seen-wins
/// tie breaking in the fuzzy and pattern tiers is reproducible.
#[derive(Debug, Clone, Default)]
pub struct QuestionCaseMap {
    entries: Vec<(String, MappingEntry)>,
}

impl QuestionCaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw mapping source. Malformed input yields an empty map with a
    /// warning on stderr; it never fails.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Map<String, Value>>(raw) {
            Ok(object) => {
                let entries = object
                    .into_iter()
                    .map(|(id, value)| {
                        let entry = serde_json::from_value(value).unwrap_or_default();
                        (id, entry)
                    })
                    .collect();
                Self { entries }
            }
            Err(e) => {
                eprintln!(
                    "{}: question-case map is not a valid JSON object ({}), continuing without mapping",
                    "Warning".yellow().bold(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Read and parse a mapping file. A missing or unreadable file yields an
    /// empty map with a warning on stderr.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw),
            Err(e) => {
                eprintln!(
                    "{}: could not read question-case map {} ({}), continuing without mapping",
                    "Warning".yellow().bold(),
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// Diagnostic scan of the loaded table. Advisory only: duplicates and
    /// missing questions are reported, never rejected, and the result has no
    /// effect on matching behavior.
    pub fn validate(&self) -> MapReport {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut missing_question = 0;
        let mut with_assertion = 0;
        for (_, entry) in &self.entries {
            match entry.question.as_deref() {
                Some(q) => *seen.entry(q).or_insert(0) += 1,
                None => missing_question += 1,
            }
            if entry.assertion.is_some() {
                with_assertion += 1;
            }
        }
        let mut duplicate_questions: Vec<String> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(q, _)| q.to_string())
            .collect();
        duplicate_questions.sort();
        MapReport {
            total_entries: self.entries.len(),
            missing_question,
            with_assertion,
            duplicate_questions,
        }
    }
}

/// Data-quality summary of a mapping table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapReport {
    pub total_entries: usize,
    pub missing_question: usize,
    pub with_assertion: usize,
    pub duplicate_questions: Vec<String>,
}
