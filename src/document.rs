//! Evaluation document model and structural validation
//!
//! Parses the PromptFoo-style result JSON. Only the top-level structure is
//! enforced (`results.prompts` and `results.results` must be arrays); every
//! per-case field is optional and degrades to a placeholder at render time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why a document was rejected. Rejection aborts report generation entirely;
/// anything below the top-level structure is tolerated instead.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid evaluation structure: missing {0}")]
    InvalidStructure(&'static str),
}

/// Top-level parsed evaluation result. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalDocument {
    /// Run identifier assigned by the evaluation tool
    pub eval_id: Option<String>,
    pub results: EvalResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalResults {
    pub timestamp: Option<String>,
    pub prompts: Vec<PromptInfo>,
    pub results: Vec<TestCaseResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptInfo {
    pub provider: Option<String>,
    pub metrics: Option<PromptMetrics>,
}

/// Run-level aggregate metrics reported by the first prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptMetrics {
    pub total_latency_ms: Option<f64>,
    pub token_usage: Option<TokenUsage>,
    pub assert_pass_count: Option<u64>,
    pub assert_fail_count: Option<u64>,
    pub test_error_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenUsage {
    pub num_requests: Option<u64>,
}

/// One evaluated case. Identity is positional; there is no required key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCaseResult {
    pub vars: Option<CaseVars>,
    /// Legacy variant nests vars one level deeper
    pub test_case: Option<LegacyTestCase>,
    pub score: f64,
    pub success: bool,
    pub grading_result: Option<GradingResult>,
    pub response: Option<ResponsePayload>,
    pub metadata: Option<CaseMetadata>,
    /// Native question-group identifier, when the document supplies one
    pub question_id: Option<String>,
    /// Native test identifier, when the document supplies one
    pub test_id: Option<String>,
    /// Native opaque identifier, when the document supplies one
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyTestCase {
    pub vars: Option<CaseVars>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseVars {
    pub question: Option<String>,
    pub image: Option<ImageVar>,
}

/// Image payload: raw base64, a data URI, or a legacy `{name, data}` pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageVar {
    Raw(String),
    Named { name: Option<String>, data: String },
}

impl ImageVar {
    pub fn data(&self) -> &str {
        match self {
            ImageVar::Raw(s) => s,
            ImageVar::Named { data, .. } => data,
        }
    }

    /// Build an `img src` value. Raw base64 gets a data-URI prefix using the
    /// format hint; a best-effort guess, not a correctness requirement.
    pub fn as_src(&self, format_hint: &str) -> String {
        let data = self.data();
        if data.starts_with("data:image") {
            data.to_string()
        } else {
            format!("data:image/{};base64,{}", format_hint, data)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradingResult {
    pub component_results: Vec<AssertionOutcome>,
}

/// Outcome of one grading check
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssertionOutcome {
    pub assertion: Option<AssertionSpec>,
    pub pass: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssertionSpec {
    /// Assertion kind: "is-json", "llm-rubric", "contains", or anything else
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<Value>,
    pub transform: Option<String>,
}

impl AssertionSpec {
    pub fn is_json(&self) -> bool {
        self.kind == "is-json"
    }

    /// Human-readable description for the per-assertion breakdown
    pub fn describe(&self) -> String {
        let value = |v: &Option<Value>| match v {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        match self.kind.as_str() {
            "is-json" => "JSON Schema Validation".to_string(),
            "llm-rubric" => format!("LLM Rubric: {}", value(&self.value)),
            "contains" => format!("Contains: {}", value(&self.value)),
            "" => "Unknown Test".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponsePayload {
    pub raw: Option<String>,
    pub output: Option<Value>,
}

impl ResponsePayload {
    /// Pretty-printed structured output when present, raw text otherwise
    pub fn formatted(&self) -> String {
        match &self.output {
            Some(output) => serde_json::to_string_pretty(output)
                .unwrap_or_else(|_| self.raw.clone().unwrap_or_default()),
            None => self.raw.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseMetadata {
    pub http: Option<HttpMeta>,
    #[serde(rename = "_promptfooFileMetadata")]
    pub file_metadata: Option<FileMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpMeta {
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetadata {
    pub image: Option<ImageFileMeta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFileMeta {
    pub format: Option<String>,
}

impl TestCaseResult {
    /// Merged vars accessor: top-level `vars` wins, legacy `testCase.vars` second
    pub fn vars(&self) -> Option<&CaseVars> {
        self.vars
            .as_ref()
            .or_else(|| self.test_case.as_ref().and_then(|tc| tc.vars.as_ref()))
    }

    /// Question text for display and matching; positional placeholder when absent
    pub fn question_text(&self, index: usize) -> String {
        self.vars()
            .and_then(|v| v.question.clone())
            .unwrap_or_else(|| format!("Test Case {}", index + 1))
    }

    /// Grading outcomes, empty when the case carries none
    pub fn assertion_outcomes(&self) -> &[AssertionOutcome] {
        self.grading_result
            .as_ref()
            .map(|g| g.component_results.as_slice())
            .unwrap_or(&[])
    }

    /// Image format hint from metadata, defaulting to webp
    pub fn image_format(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.file_metadata.as_ref())
            .and_then(|fm| fm.image.as_ref())
            .and_then(|i| i.format.as_deref())
            .unwrap_or("webp")
    }
}

impl EvalDocument {
    /// Parse and validate a raw evaluation document.
    ///
    /// Invalid JSON or missing `results.prompts` / `results.results` is a hard
    /// failure: no partial report is produced from a malformed document.
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        let results = value
            .get("results")
            .ok_or(DocumentError::InvalidStructure("results"))?;
        if !results.get("prompts").is_some_and(Value::is_array) {
            return Err(DocumentError::InvalidStructure("results.prompts"));
        }
        if !results.get("results").is_some_and(Value::is_array) {
            return Err(DocumentError::InvalidStructure("results.results"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Provider of the first prompt; "N/A" when the document names none
    pub fn endpoint(&self) -> &str {
        self.results
            .prompts
            .first()
            .and_then(|p| p.provider.as_deref())
            .unwrap_or("N/A")
    }

    /// Run-level metrics from the first prompt, when present
    pub fn metrics(&self) -> Option<&PromptMetrics> {
        self.results.prompts.first().and_then(|p| p.metrics.as_ref())
    }
}
