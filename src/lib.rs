//! Evalview: HTML report generator for LLM evaluation results
//!
//! This library turns a PromptFoo-style evaluation JSON document into a
//! self-contained HTML report, resolving a stable human-assigned identifier
//! for each test case via the question-case mapping table.

pub mod document;
pub mod mapping;
pub mod matcher;
pub mod reporter;

use serde::{Deserialize, Serialize};

/// Outcome of resolving one test case against the mapping table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Resolved identifier, if any pass produced one
    pub id: Option<String>,
    /// Confidence in the resolved identifier (0-100)
    pub confidence: u8,
    /// How the identifier was resolved
    pub match_type: MatchType,
}

impl MatchResult {
    /// Precondition failure (empty question): no id, zero confidence
    pub fn none() -> Self {
        Self {
            id: None,
            confidence: 0,
            match_type: MatchType::None,
        }
    }

    /// No pass matched
    pub fn no_match() -> Self {
        Self {
            id: None,
            confidence: 0,
            match_type: MatchType::NoMatch,
        }
    }
}

/// How a test case identifier was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// is-json assertion short-circuit (no table lookup)
    SpecialJson,
    /// Question and declared assertion both matched exactly
    ExactWithAssertion,
    /// Question matched exactly; entry declares an assertion but none of the
    /// input assertions matched it
    ExactQuestionOnly,
    /// Question matched exactly and the entry has no assertion to check
    ExactQuestion,
    /// Normalized containment or edit-distance similarity above threshold
    FuzzyMatch,
    /// Identifier found by question-number pattern in the table keys
    PatternBased,
    /// No pass matched
    NoMatch,
    /// Precondition failure (empty question)
    None,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::SpecialJson => write!(f, "special-json"),
            MatchType::ExactWithAssertion => write!(f, "exact-with-assertion"),
            MatchType::ExactQuestionOnly => write!(f, "exact-question-only"),
            MatchType::ExactQuestion => write!(f, "exact-question"),
            MatchType::FuzzyMatch => write!(f, "fuzzy-match"),
            MatchType::PatternBased => write!(f, "pattern-based"),
            MatchType::NoMatch => write!(f, "no-match"),
            MatchType::None => write!(f, "none"),
        }
    }
}

/// Per-match-type tallies accumulated over a batch of test cases.
/// Returned alongside the batch result, never kept as ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub special_json: usize,
    pub exact_with_assertion: usize,
    pub exact_question_only: usize,
    pub exact_question: usize,
    pub fuzzy_match: usize,
    pub pattern_based: usize,
    pub no_match: usize,
}

impl MatchStats {
    pub fn record(&mut self, result: &MatchResult) {
        match result.match_type {
            MatchType::SpecialJson => self.special_json += 1,
            MatchType::ExactWithAssertion => self.exact_with_assertion += 1,
            MatchType::ExactQuestionOnly => self.exact_question_only += 1,
            MatchType::ExactQuestion => self.exact_question += 1,
            MatchType::FuzzyMatch => self.fuzzy_match += 1,
            MatchType::PatternBased => self.pattern_based += 1,
            // Empty-question cases fall through to the fallback generator,
            // so they tally with the unmatched ones.
            MatchType::NoMatch | MatchType::None => self.no_match += 1,
        }
    }

    /// Cases resolved through the mapping table (any tier above fallback)
    pub fn mapped(&self) -> usize {
        self.special_json
            + self.exact_with_assertion
            + self.exact_question_only
            + self.exact_question
            + self.fuzzy_match
            + self.pattern_based
    }

    pub fn total(&self) -> usize {
        self.mapped() + self.no_match
    }
}

/// One test case with its final identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCase {
    /// Position in the results sequence (0-indexed)
    pub index: usize,
    /// Final identifier, never empty (fallback generator applied)
    pub id: String,
    /// How the matcher classified this case
    pub match_result: MatchResult,
}

/// Public API: generate the full HTML report for a parsed document.
///
/// * `doc` - parsed evaluation document
/// * `map` - question-case mapping table (may be empty)
pub fn generate_report(doc: &document::EvalDocument, map: &mapping::QuestionCaseMap) -> String {
    let (resolved, stats) = matcher::resolve_cases(doc, map);
    let map_report = map.validate();
    reporter::HtmlReporter::new().report(doc, &resolved, &stats, &map_report)
}
