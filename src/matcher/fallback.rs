//! Fallback ID generation for cases the mapping table cannot resolve
//!
//! Never fails: every case gets a non-empty identifier, from native fields
//! when the document carries them, otherwise synthesized from text patterns
//! or the case's position.

use crate::document::TestCaseResult;
use regex::Regex;
use std::sync::OnceLock;

fn question_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)question\s*(\d+)").expect("valid regex"))
}

fn test_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)test\s*(\d+)").expect("valid regex"))
}

/// Extract a question number from text ("Question 7: ..." -> 7)
pub fn question_number(text: &str) -> Option<u32> {
    question_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract a test number from text ("... test 2 ..." -> 2)
pub fn test_number(text: &str) -> Option<u32> {
    test_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Synthesize an identifier for a case with no mapping result.
///
/// Priority: native questionId+testId pair, native opaque id, then
/// `question{N}_test{M}` from text patterns (N defaults to the 1-based
/// position, M to 0).
pub fn fallback_id(case: &TestCaseResult, index: usize) -> String {
    if let (Some(q), Some(t)) = (case.question_id.as_deref(), case.test_id.as_deref()) {
        if !q.is_empty() && !t.is_empty() {
            return format!("{}_{}", q, t);
        }
    }
    if let Some(id) = case.id.as_deref() {
        if !id.is_empty() {
            return id.to_string();
        }
    }
    let question = case.question_text(index);
    let n = question_number(&question).unwrap_or(index as u32 + 1);
    let m = test_number(&question).unwrap_or(0);
    format!("question{}_test{}", n, m)
}
