//! Question matcher: resolves a human-assigned identifier per test case
//!
//! Ranked matching passes, evaluated in order, first success wins:
//!
//! 0. is-json short-circuit (no table lookup; such cases are structurally
//!    interchangeable and always map to test 0 of their question)
//! 1. exact question + exact assertion (confidence 100)
//! 2. exact question, entry assertion present but unmatched (80)
//! 3. exact question, entry has no assertion (90)
//! 4. fuzzy: normalized containment or edit-distance similarity > 60
//! 5. pattern: table key contains "question{N}" from the input text (50)
//! 6. no match
//!
//! The matcher is a pure function of (question, assertions, table); batch
//! resolution folds it over the document in order and returns the per-type
//! tallies as a value.

pub mod fallback;
pub mod similarity;

use crate::document::{AssertionSpec, EvalDocument};
use crate::mapping::QuestionCaseMap;
use crate::{MatchResult, MatchStats, MatchType, ResolvedCase};
use serde_json::Value;

/// Minimum similarity percentage for the fuzzy tier
const FUZZY_THRESHOLD: u8 = 60;
/// Fuzzy confidence is capped below the exact tiers (min 80) so a 95%+
/// similarity can never outrank an exact match downstream.
const FUZZY_CAP: u8 = 79;
const CONFIDENCE_SPECIAL_JSON: u8 = 92;
const CONFIDENCE_EXACT_WITH_ASSERTION: u8 = 100;
const CONFIDENCE_EXACT_QUESTION_ONLY: u8 = 80;
const CONFIDENCE_EXACT_QUESTION: u8 = 90;
const CONFIDENCE_PATTERN: u8 = 50;

/// Resolve the best identifier candidate for one question.
///
/// Deterministic: identical (question, assertions, table) always yields an
/// identical result. Table iteration follows document order, so first-seen
/// tie breaking is reproducible.
pub fn find_match(
    question: &str,
    assertions: &[AssertionSpec],
    map: &QuestionCaseMap,
) -> MatchResult {
    if question.is_empty() {
        return MatchResult::none();
    }

    // is-json cases bypass the table entirely, even an empty one
    if assertions.iter().any(|a| a.is_json()) {
        let n = fallback::question_number(question).unwrap_or(1);
        return MatchResult {
            id: Some(format!("question{}_test0", n)),
            confidence: CONFIDENCE_SPECIAL_JSON,
            match_type: MatchType::SpecialJson,
        };
    }

    // Pass 1: exact question + exact assertion
    for (id, entry) in map.iter() {
        if entry.question.as_deref() != Some(question) {
            continue;
        }
        if let Some(expected) = &entry.assertion {
            let matched = assertions
                .iter()
                .any(|a| a.kind == expected.kind && assertion_values_equal(&a.value, &expected.value));
            if matched {
                return MatchResult {
                    id: Some(id.to_string()),
                    confidence: CONFIDENCE_EXACT_WITH_ASSERTION,
                    match_type: MatchType::ExactWithAssertion,
                };
            }
        }
    }

    // Pass 2: exact question, entry declares an assertion no input matched
    for (id, entry) in map.iter() {
        if entry.question.as_deref() == Some(question) && entry.assertion.is_some() {
            return MatchResult {
                id: Some(id.to_string()),
                confidence: CONFIDENCE_EXACT_QUESTION_ONLY,
                match_type: MatchType::ExactQuestionOnly,
            };
        }
    }

    // Pass 3: exact question, nothing to disambiguate
    for (id, entry) in map.iter() {
        if entry.question.as_deref() == Some(question) && entry.assertion.is_none() {
            return MatchResult {
                id: Some(id.to_string()),
                confidence: CONFIDENCE_EXACT_QUESTION,
                match_type: MatchType::ExactQuestion,
            };
        }
    }

    // Pass 4: fuzzy match over normalized strings; highest raw similarity
    // wins, first-seen entry wins ties. The cap applies to the reported
    // confidence only, never to candidate selection.
    let normalized = similarity::normalize(question);
    let mut best: Option<(&str, u8)> = None;
    for (id, entry) in map.iter() {
        let Some(entry_question) = entry.question.as_deref() else {
            continue;
        };
        let entry_normalized = similarity::normalize(entry_question);
        let pct = similarity::similarity_pct(&normalized, &entry_normalized);
        let contains = !normalized.is_empty()
            && !entry_normalized.is_empty()
            && (normalized.contains(&entry_normalized) || entry_normalized.contains(&normalized));
        if (contains || pct > FUZZY_THRESHOLD) && best.is_none_or(|(_, b)| pct > b) {
            best = Some((id, pct));
        }
    }
    if let Some((id, pct)) = best {
        return MatchResult {
            id: Some(id.to_string()),
            confidence: pct.min(FUZZY_CAP),
            match_type: MatchType::FuzzyMatch,
        };
    }

    // Pass 5: question-number pattern against the table keys
    if let Some(n) = fallback::question_number(question) {
        let needle = format!("question{}", n);
        for (id, _) in map.iter() {
            if id.contains(&needle) {
                return MatchResult {
                    id: Some(id.to_string()),
                    confidence: CONFIDENCE_PATTERN,
                    match_type: MatchType::PatternBased,
                };
            }
        }
    }

    MatchResult::no_match()
}

/// Assertion value equality: structural JSON equality, plus the legacy form
/// where the input value arrives pre-serialized as a string.
fn assertion_values_equal(input: &Option<Value>, expected: &Option<Value>) -> bool {
    match (input, expected) {
        (None, None) => true,
        (Some(Value::String(s)), None) => s.is_empty(),
        (Some(_), None) => false,
        (None, Some(_)) => false,
        (Some(a), Some(b)) => {
            if a == b {
                return true;
            }
            if let Value::String(s) = a {
                if let Ok(serialized) = serde_json::to_string(b) {
                    return *s == serialized;
                }
            }
            false
        }
    }
}

/// Resolve every case in the document, in order.
///
/// Pure fold: the matcher runs per case, the fallback generator covers any
/// null candidate, and the per-type tallies come back as a value.
pub fn resolve_cases(doc: &EvalDocument, map: &QuestionCaseMap) -> (Vec<ResolvedCase>, MatchStats) {
    let mut stats = MatchStats::default();
    let resolved = doc
        .results
        .results
        .iter()
        .enumerate()
        .map(|(index, case)| {
            let question = case.question_text(index);
            let assertions: Vec<AssertionSpec> = case
                .assertion_outcomes()
                .iter()
                .filter_map(|o| o.assertion.clone())
                .collect();
            let match_result = find_match(&question, &assertions, map);
            stats.record(&match_result);
            let id = match_result
                .id
                .clone()
                .unwrap_or_else(|| fallback::fallback_id(case, index));
            ResolvedCase {
                index,
                id,
                match_result,
            }
        })
        .collect();
    (resolved, stats)
}
