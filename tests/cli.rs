//! CLI behavior tests: exit codes, report output, mapping fallback.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;

fn evalview_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_evalview"))
}

fn write_results(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("results.json");
    let raw = json!({
        "evalId": "cli-run",
        "results": {
            "timestamp": "2024-05-10T09:30:00Z",
            "prompts": [{"provider": "openai:gpt-4o"}],
            "results": [
                {"vars": {"question": "What color is the sky?"},
                 "score": 1.0, "success": true,
                 "gradingResult": {"componentResults": [
                     {"assertion": {"type": "contains", "value": "blue"}, "pass": true}
                 ]}},
                {"vars": {"question": "Question 2: something else"},
                 "score": 0.0, "success": false}
            ]
        }
    })
    .to_string();
    fs::write(&path, raw).unwrap();
    path
}

fn write_map(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("question_case_map.json");
    let raw = json!({
        "q1_t1": {"question": "What color is the sky?",
                  "assertion": {"type": "contains", "value": "blue"}}
    })
    .to_string();
    fs::write(&path, raw).unwrap();
    path
}

#[test]
fn no_args_returns_error_not_panic() {
    let mut cmd = evalview_cmd();
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("RESULTS"));
}

#[test]
fn file_not_found_exit_2() {
    let mut cmd = evalview_cmd();
    cmd.arg("nonexistent.json");
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn malformed_document_exit_2() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"results": {"results": []}}"#).unwrap();
    let mut cmd = evalview_cmd();
    cmd.arg(&path).arg("--output").arg(dir.path().join("out.html"));
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("results.prompts"));
    assert!(!dir.path().join("out.html").exists(), "no partial output");
}

#[test]
fn invalid_json_exit_2() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{not json").unwrap();
    let mut cmd = evalview_cmd();
    cmd.arg(&path);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn generates_report_with_sibling_map() {
    let dir = tempfile::TempDir::new().unwrap();
    let results = write_results(dir.path());
    write_map(dir.path());
    let out = dir.path().join("report.html");

    let mut cmd = evalview_cmd();
    cmd.arg(&results).arg("--output").arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 cases"))
        .stdout(predicate::str::contains("1 mapped via table"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("q1_t1"));
    assert!(html.contains("cli-run"));
    assert!(html.contains("question2_test0"));
}

#[test]
fn missing_map_warns_and_falls_back() {
    let dir = tempfile::TempDir::new().unwrap();
    let results = write_results(dir.path());
    let out = dir.path().join("report.html");

    let mut cmd = evalview_cmd();
    cmd.arg(&results).arg("--output").arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("no question-case map"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("question1_test0"));
    assert!(html.contains("question2_test0"));
}

#[test]
fn explicit_map_path_is_used() {
    let dir = tempfile::TempDir::new().unwrap();
    let results = write_results(dir.path());
    let map_dir = tempfile::TempDir::new().unwrap();
    let map = map_dir.path().join("custom_map.json");
    fs::write(
        &map,
        json!({"custom_id": {"question": "What color is the sky?"}}).to_string(),
    )
    .unwrap();
    let out = dir.path().join("report.html");

    let mut cmd = evalview_cmd();
    cmd.arg(&results).arg("--map").arg(&map).arg("--output").arg(&out);
    cmd.assert().success();

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("custom_id"));
}

#[test]
fn verbose_prints_mapping_diagnostics() {
    let dir = tempfile::TempDir::new().unwrap();
    let results = write_results(dir.path());
    write_map(dir.path());
    let out = dir.path().join("report.html");

    let mut cmd = evalview_cmd();
    cmd.arg(&results).arg("--verbose").arg("--output").arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("exact-with-assertion"))
        .stderr(predicate::str::contains("q1_t1"));
}

#[test]
fn quiet_suppresses_summary() {
    let dir = tempfile::TempDir::new().unwrap();
    let results = write_results(dir.path());
    write_map(dir.path());
    let out = dir.path().join("report.html");

    let mut cmd = evalview_cmd();
    cmd.arg(&results).arg("--quiet").arg("--output").arg(&out);
    cmd.assert().success().stdout(predicate::str::is_empty());
}
