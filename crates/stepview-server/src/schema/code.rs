//! Schema types for the stateless code endpoints.

use serde::{Deserialize, Serialize};
use stepview_core::{CodeAnalysis, CodeExplanation, CodePattern, ExecutionTrace};
use stepview_synth::Origin;

pub const DEFAULT_LANGUAGE: &str = "python";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Source code plus its declared (advisory) language.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceResponse {
    pub pattern: CodePattern,
    pub origin: Origin,
    pub steps: ExecutionTrace,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub pattern: CodePattern,
    pub origin: Origin,
    pub analysis: CodeAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub pattern: CodePattern,
    pub origin: Origin,
    pub explanation: CodeExplanation,
}

/// `status` is `remote`, `canned` or `unavailable`; for `unavailable` the
/// answer is a message explaining why.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub status: &'static str,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether a remote assistant credential is configured.
    pub credential: bool,
}
