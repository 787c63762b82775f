//! Result shapes of the code assistant besides traces.
//!
//! These do not share a schema with [`ExecutionTrace`](crate::ExecutionTrace)
//! and are parsed independently, but they travel through the same resilient
//! extraction path and have offline defaults of their own.

use serde::{Deserialize, Serialize};

/// Time and space complexity, as free text (e.g. `"O(n log n)"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub time: String,
    pub space: String,
}

/// High-level analysis of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub explanation: String,
    pub complexity: Complexity,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Explanation attached to one source line (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineExplanation {
    pub line: usize,
    pub code: String,
    pub explanation: String,
}

/// Summary plus per-line walkthrough of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExplanation {
    pub summary: String,
    #[serde(default)]
    pub line_by_line_explanation: Vec<LineExplanation>,
}
