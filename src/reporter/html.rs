//! HTML reporter: renders a self-contained evaluation report
//!
//! One row per test case (identifier badge, question, image, pass/fail badge
//! with per-assertion breakdown, score, response viewer, failure details) and
//! a summary block with totals, run metrics, and the mapping-confidence
//! breakdown. Everything is escaped; missing fields degrade to placeholders.

use crate::document::{EvalDocument, TestCaseResult};
use crate::mapping::MapReport;
use crate::{MatchStats, MatchType, ResolvedCase};
use chrono::Local;

/// Escapes text for safe embedding in HTML element content and attributes
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reporter that generates a self-contained HTML document
pub struct HtmlReporter;

impl HtmlReporter {
    pub fn new() -> Self {
        Self
    }

    /// Generate the full HTML report
    pub fn report(
        &self,
        doc: &EvalDocument,
        resolved: &[ResolvedCase],
        stats: &MatchStats,
        map_report: &MapReport,
    ) -> String {
        let mut html = String::with_capacity(32_768);
        html.push_str(Self::template_head());
        html.push_str(&self.render_header(doc, map_report));
        html.push_str(Self::table_open());
        for case in resolved {
            if let Some(result) = doc.results.results.get(case.index) {
                html.push_str(&self.render_row(result, case));
            }
        }
        html.push_str("</tbody>\n</table>\n");
        html.push_str(&self.render_summary(doc, stats));
        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_header(&self, doc: &EvalDocument, map_report: &MapReport) -> String {
        let mut header = String::new();
        header.push_str("<div class=\"report-header\">\n<h2>Evaluation Report</h2>\n");
        header.push_str(&format!(
            "<p><strong>Evaluation ID:</strong> {}</p>\n",
            escape_html(doc.eval_id.as_deref().unwrap_or("N/A"))
        ));
        header.push_str(&format!(
            "<p><strong>Timestamp:</strong> {}</p>\n",
            escape_html(doc.results.timestamp.as_deref().unwrap_or("N/A"))
        ));
        header.push_str(&format!(
            "<p><strong>Endpoint:</strong> {}</p>\n",
            escape_html(doc.endpoint())
        ));
        header.push_str(&format!(
            "<p class=\"meta\">Generated {}",
            Local::now().format("%Y-%m-%d %H:%M")
        ));
        if map_report.total_entries > 0 {
            header.push_str(&format!(
                " · mapping table: {} entries",
                map_report.total_entries
            ));
            if !map_report.duplicate_questions.is_empty() {
                header.push_str(&format!(
                    ", {} duplicate question(s)",
                    map_report.duplicate_questions.len()
                ));
            }
        } else {
            header.push_str(" · no mapping table");
        }
        header.push_str("</p>\n</div>\n");
        header
    }

    fn render_row(&self, result: &TestCaseResult, case: &ResolvedCase) -> String {
        let question = result.question_text(case.index);
        let status = if result.success { "PASS" } else { "FAIL" };
        let status_class = if result.success { "pass" } else { "fail" };

        let image_html = result
            .vars()
            .and_then(|v| v.image.as_ref())
            .map(|img| {
                format!(
                    "<img class=\"report-image\" src=\"{}\" alt=\"Test image\"/>",
                    escape_html(&img.as_src(result.image_format()))
                )
            })
            .unwrap_or_default();

        let mut test_info = String::new();
        let mut failed_details = String::new();
        for outcome in result.assertion_outcomes() {
            let desc = outcome
                .assertion
                .as_ref()
                .map(|a| a.describe())
                .unwrap_or_else(|| "Unknown Test".to_string());
            let (class, mark) = if outcome.pass {
                ("test-pass", "✅")
            } else {
                ("test-fail", "❌")
            };
            test_info.push_str(&format!(
                "<div class=\"{}\">{} {}</div>\n",
                class,
                mark,
                escape_html(&desc)
            ));
            if !outcome.pass {
                let expected = outcome
                    .assertion
                    .as_ref()
                    .and_then(|a| a.value.as_ref())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                failed_details.push_str(&format!(
                    "<div class=\"failure-detail\">\n<strong>Test:</strong> {}<br>\n<strong>Expected:</strong> {}<br>\n<strong>Reason:</strong> {}<br>\n",
                    escape_html(&desc),
                    escape_html(&expected),
                    escape_html(outcome.reason.as_deref().unwrap_or(""))
                ));
                if let Some(transform) = outcome.assertion.as_ref().and_then(|a| a.transform.as_deref()) {
                    failed_details.push_str(&format!(
                        "<strong>Transform:</strong> {}<br>\n",
                        escape_html(transform)
                    ));
                }
                failed_details.push_str("</div>\n");
            }
        }

        let http_status = result
            .metadata
            .as_ref()
            .and_then(|m| m.http.as_ref())
            .and_then(|h| h.status)
            .map(|s| format!("<div class=\"http-status\">HTTP {}</div>\n", s))
            .unwrap_or_default();

        let formatted = result
            .response
            .as_ref()
            .map(|r| r.formatted())
            .unwrap_or_default();

        format!(
            "<tr class=\"{status_class}\">\n\
             <td class=\"question-id-cell\"><div class=\"test-id-badge\" title=\"{match_type} ({confidence}%)\">{id}</div></td>\n\
             <td class=\"question-cell\">{question}</td>\n\
             <td class=\"image-cell\">{image_html}</td>\n\
             <td class=\"status-cell\"><span class=\"status-badge {status_class}\">{status}</span>\n{http_status}<div class=\"test-details\">{test_info}</div></td>\n\
             <td class=\"score-cell\">{score:.1}%</td>\n\
             <td class=\"response-cell\"><details><summary>View Response</summary><pre class=\"response-content\">{response}</pre></details></td>\n\
             <td class=\"failures-cell\">{failed_details}</td>\n\
             </tr>\n",
            status_class = status_class,
            match_type = case.match_result.match_type,
            confidence = case.match_result.confidence,
            id = escape_html(&case.id),
            question = escape_html(&question),
            image_html = image_html,
            status = status,
            http_status = http_status,
            test_info = test_info,
            score = result.score * 100.0,
            response = escape_html(&formatted),
            failed_details = failed_details,
        )
    }

    fn render_summary(&self, doc: &EvalDocument, stats: &MatchStats) -> String {
        let results = &doc.results.results;
        let total = results.len();
        let passed = results.iter().filter(|r| r.success).count();
        let failed = total - passed;
        let (pass_rate, avg_score) = if total > 0 {
            let avg = results.iter().map(|r| r.score).sum::<f64>() / total as f64;
            (100.0 * passed as f64 / total as f64, avg * 100.0)
        } else {
            (0.0, 0.0)
        };

        let metrics = doc.metrics();
        let fmt_u64 = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into());
        let latency = metrics
            .and_then(|m| m.total_latency_ms)
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "N/A".into());
        let requests = fmt_u64(
            metrics
                .and_then(|m| m.token_usage.as_ref())
                .and_then(|t| t.num_requests),
        );

        let mut mapping_rows = String::new();
        for (label, count) in [
            (MatchType::ExactWithAssertion.to_string(), stats.exact_with_assertion),
            (MatchType::ExactQuestion.to_string(), stats.exact_question),
            (MatchType::ExactQuestionOnly.to_string(), stats.exact_question_only),
            (MatchType::SpecialJson.to_string(), stats.special_json),
            (MatchType::FuzzyMatch.to_string(), stats.fuzzy_match),
            (MatchType::PatternBased.to_string(), stats.pattern_based),
            ("fallback".to_string(), stats.no_match),
        ] {
            if count > 0 {
                mapping_rows.push_str(&format!("<p><strong>{}:</strong> {}</p>\n", label, count));
            }
        }
        if mapping_rows.is_empty() {
            mapping_rows.push_str("<p>No test cases.</p>\n");
        }

        format!(
            "<div class=\"summary-section\">\n<h3>Evaluation Summary</h3>\n<div class=\"summary-grid\">\n\
             <div class=\"summary-card\">\n<h4>Test Results</h4>\n\
             <p><strong>Total Tests:</strong> {total}</p>\n\
             <p><strong>Passed:</strong> <span class=\"pass-count\">{passed}</span></p>\n\
             <p><strong>Failed:</strong> <span class=\"fail-count\">{failed}</span></p>\n\
             <p><strong>Success Rate:</strong> {pass_rate:.1}%</p>\n</div>\n\
             <div class=\"summary-card\">\n<h4>Performance</h4>\n\
             <p><strong>Average Score:</strong> {avg_score:.1}%</p>\n\
             <p><strong>Total Latency:</strong> {latency}</p>\n\
             <p><strong>Requests:</strong> {requests}</p>\n</div>\n\
             <div class=\"summary-card\">\n<h4>Assertions</h4>\n\
             <p><strong>Passed:</strong> {assert_pass}</p>\n\
             <p><strong>Failed:</strong> {assert_fail}</p>\n\
             <p><strong>Errors:</strong> {assert_err}</p>\n</div>\n\
             <div class=\"summary-card\">\n<h4>Mapping Confidence</h4>\n{mapping_rows}</div>\n\
             </div>\n</div>\n",
            total = total,
            passed = passed,
            failed = failed,
            pass_rate = pass_rate,
            avg_score = avg_score,
            latency = latency,
            requests = requests,
            assert_pass = fmt_u64(metrics.and_then(|m| m.assert_pass_count)),
            assert_fail = fmt_u64(metrics.and_then(|m| m.assert_fail_count)),
            assert_err = fmt_u64(metrics.and_then(|m| m.test_error_count)),
            mapping_rows = mapping_rows,
        )
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head() -> &'static str {
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Evalview – Evaluation Report</title>
<style>
:root{--bg:#0d0d11;--surface:#16161b;--surface2:#1e1e24;--border:#2a2a32;--text:#e4e4e7;--muted:#71717a;--green:#22c55e;--red:#ef4444;--blue:#3b82f6;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Oxygen,sans-serif;background:var(--bg);color:var(--text);line-height:1.5;padding:1.5rem}
.report-header{margin-bottom:1.25rem;padding-bottom:1rem;border-bottom:1px solid var(--border)}
.report-header h2{font-size:1.25rem;font-weight:700;margin-bottom:.5rem}
.report-header p{font-size:.875rem;margin:.125rem 0}
.report-header .meta{color:var(--muted);font-size:.75rem;margin-top:.5rem}
table{width:100%;border-collapse:collapse;font-size:.8125rem}
thead th{text-align:left;padding:.5rem .625rem;border-bottom:2px solid var(--border);color:var(--muted);text-transform:uppercase;font-size:.6875rem;letter-spacing:.5px}
td{padding:.625rem;border-bottom:1px solid var(--border);vertical-align:top}
tr.pass{background:rgba(34,197,94,.04)}
tr.fail{background:rgba(239,68,68,.05)}
.test-id-badge{display:inline-block;font-family:'SF Mono',Consolas,monospace;font-size:.75rem;background:var(--surface2);border:1px solid var(--border);border-radius:var(--radius);padding:.2rem .5rem;white-space:nowrap}
.question-cell{max-width:320px}
.report-image{max-width:160px;max-height:120px;border-radius:var(--radius)}
.status-badge{display:inline-block;font-weight:700;font-size:.6875rem;padding:.125rem .5rem;border-radius:10px;text-transform:uppercase}
.status-badge.pass{background:rgba(34,197,94,.15);color:var(--green)}
.status-badge.fail{background:rgba(239,68,68,.15);color:var(--red)}
.http-status{font-size:.6875rem;color:var(--muted);margin-top:.25rem}
.test-details{margin-top:.375rem;font-size:.75rem}
.test-pass{color:var(--green)}
.test-fail{color:var(--red)}
.score-cell{font-variant-numeric:tabular-nums;white-space:nowrap}
.response-cell details summary{cursor:pointer;color:var(--blue);font-size:.75rem}
.response-content{margin-top:.375rem;background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.5rem;font-size:.6875rem;max-width:360px;max-height:240px;overflow:auto;white-space:pre-wrap}
.failure-detail{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.5rem;margin-bottom:.375rem;font-size:.75rem}
.summary-section{margin-top:1.5rem;padding-top:1rem;border-top:1px solid var(--border)}
.summary-section h3{font-size:1rem;margin-bottom:.75rem}
.summary-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:.75rem}
.summary-card{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.75rem 1rem}
.summary-card h4{font-size:.8125rem;margin-bottom:.5rem;color:var(--muted);text-transform:uppercase;letter-spacing:.5px}
.summary-card p{font-size:.8125rem;margin:.125rem 0}
.pass-count{color:var(--green);font-weight:600}
.fail-count{color:var(--red);font-weight:600}
</style>
</head>
<body>
"##
    }

    fn table_open() -> &'static str {
        r#"<table>
<thead>
<tr>
<th>Question ID</th>
<th>Question Text</th>
<th>Image</th>
<th>Test Status</th>
<th>Score</th>
<th>Response</th>
<th>Failed Assertions</th>
</tr>
</thead>
<tbody>
"#
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}
