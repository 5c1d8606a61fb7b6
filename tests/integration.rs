//! Integration tests: full pipeline from raw JSON to rendered HTML

use evalview::document::{DocumentError, EvalDocument};
use evalview::mapping::QuestionCaseMap;
use evalview::{generate_report, matcher, MatchType};
use serde_json::json;

fn results_fixture() -> String {
    json!({
        "evalId": "run-7",
        "results": {
            "timestamp": "2024-05-10T09:30:00Z",
            "prompts": [{"provider": "anthropic:messages", "metrics": {
                "totalLatencyMs": 2300.0,
                "tokenUsage": {"numRequests": 4},
                "assertPassCount": 3,
                "assertFailCount": 1,
                "testErrorCount": 0
            }}],
            "results": [
                {"vars": {"question": "What color is the sky?"},
                 "score": 1.0, "success": true,
                 "gradingResult": {"componentResults": [
                     {"assertion": {"type": "contains", "value": "blue"}, "pass": true}
                 ]}},
                {"vars": {"question": "Question 7: emit the payload as JSON"},
                 "score": 1.0, "success": true,
                 "gradingResult": {"componentResults": [
                     {"assertion": {"type": "is-json", "value": {"type": "object"}}, "pass": true}
                 ]}},
                {"vars": {"question": "what color is the sky? "},
                 "score": 0.5, "success": false,
                 "gradingResult": {"componentResults": [
                     {"assertion": {"type": "llm-rubric", "value": "mentions blue"},
                      "pass": false, "reason": "said green"}
                 ]}},
                {"vars": {"question": "Question 3 test 2 stuff"},
                 "score": 0.0, "success": false}
            ]
        }
    })
    .to_string()
}

fn map_fixture() -> QuestionCaseMap {
    QuestionCaseMap::parse(
        &json!({
            "q1_t1": {"question": "What color is the sky?",
                      "assertion": {"type": "contains", "value": "blue"}}
        })
        .to_string(),
    )
}

#[test]
fn pipeline_resolves_every_tier() {
    let doc = EvalDocument::parse(&results_fixture()).unwrap();
    let (resolved, stats) = matcher::resolve_cases(&doc, &map_fixture());

    assert_eq!(resolved.len(), 4);

    // Exact question + assertion
    assert_eq!(resolved[0].id, "q1_t1");
    assert_eq!(resolved[0].match_result.match_type, MatchType::ExactWithAssertion);
    assert_eq!(resolved[0].match_result.confidence, 100);

    // is-json short-circuit, regardless of the table
    assert_eq!(resolved[1].id, "question7_test0");
    assert_eq!(resolved[1].match_result.match_type, MatchType::SpecialJson);

    // Case/whitespace difference lands in the fuzzy tier
    assert_eq!(resolved[2].id, "q1_t1");
    assert_eq!(resolved[2].match_result.match_type, MatchType::FuzzyMatch);
    assert!(resolved[2].match_result.confidence >= 60);

    // Unmatched case gets a synthesized identifier
    assert_eq!(resolved[3].id, "question3_test2");
    assert_eq!(resolved[3].match_result.match_type, MatchType::NoMatch);

    assert_eq!(stats.mapped(), 3);
    assert_eq!(stats.no_match, 1);
}

#[test]
fn pipeline_with_empty_map_uses_fallback_everywhere() {
    let doc = EvalDocument::parse(&results_fixture()).unwrap();
    let (resolved, stats) = matcher::resolve_cases(&doc, &QuestionCaseMap::new());

    // is-json still resolves without a table
    assert_eq!(resolved[1].id, "question7_test0");
    assert_eq!(stats.special_json, 1);
    assert_eq!(stats.no_match, 3);
    assert!(resolved.iter().all(|r| !r.id.is_empty()));
}

#[test]
fn resolution_is_deterministic_across_runs() {
    let doc = EvalDocument::parse(&results_fixture()).unwrap();
    let map = map_fixture();
    let (first, first_stats) = matcher::resolve_cases(&doc, &map);
    for _ in 0..5 {
        let (again, again_stats) = matcher::resolve_cases(&doc, &map);
        assert_eq!(again_stats, first_stats);
        for (a, b) in first.iter().zip(&again) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.match_result, b.match_result);
        }
    }
}

#[test]
fn generate_report_produces_full_html() {
    let doc = EvalDocument::parse(&results_fixture()).unwrap();
    let html = generate_report(&doc, &map_fixture());

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("run-7"));
    assert!(html.contains("anthropic:messages"));
    assert!(html.contains("q1_t1"));
    assert!(html.contains("question7_test0"));
    assert!(html.contains("question3_test2"));
    assert!(html.contains("said green"));
    assert!(html.contains("<strong>Total Tests:</strong> 4"));
    assert!(html.contains("Mapping Confidence"));
}

#[test]
fn malformed_document_aborts_generation() {
    let raw = json!({"results": {"results": []}}).to_string();
    let err = EvalDocument::parse(&raw).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::InvalidStructure("results.prompts")
    ));
}

#[test]
fn per_case_field_absence_never_aborts() {
    let raw = json!({
        "results": {
            "prompts": [{}],
            "results": [{}, {"score": 0.5}, {"vars": {}}]
        }
    })
    .to_string();
    let doc = EvalDocument::parse(&raw).unwrap();
    let html = generate_report(&doc, &QuestionCaseMap::new());
    assert!(html.contains("Test Case 1"));
    assert!(html.contains("<strong>Total Tests:</strong> 3"));
}
