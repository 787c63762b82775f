//! A single synthesized point in time of a program run.
//!
//! [`ExecutionStep`] is the unit the playback layer renders: the active source
//! line, the live variable bindings, the call stack and the program output
//! accumulated so far. Field names serialize in camelCase so that remote
//! payloads and API responses share one wire shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label of the outermost call stack frame.
pub const ROOT_FRAME: &str = "main";

/// Variable bindings visible at a step, keyed by name.
///
/// Insertion order is kept for display only and carries no meaning.
pub type Variables = IndexMap<String, serde_json::Value>;

/// One synthesized snapshot of program state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    /// Zero-based source line. May exceed the real source length for
    /// synthetic steps; see [`ExecutionStep::display_line`].
    pub line: usize,
    /// Source text associated with this step (may be empty).
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub variables: Variables,
    /// Frame labels, root first and leaf last.
    pub call_stack: Vec<String>,
    /// Cumulative program output visible through this step.
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ExecutionStep {
    /// Creates a top-level step at `line` with a `["main"]` call stack and no
    /// variables or output.
    pub fn new(line: usize, code: impl Into<String>) -> Self {
        ExecutionStep {
            line,
            code: code.into(),
            variables: Variables::new(),
            call_stack: vec![ROOT_FRAME.to_string()],
            output: String::new(),
            explanation: None,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_call_stack(mut self, frames: Vec<String>) -> Self {
        self.call_stack = frames;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Number of frames on the call stack.
    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }

    /// The innermost (leaf) frame label, if any.
    pub fn current_frame(&self) -> Option<&str> {
        self.call_stack.last().map(String::as_str)
    }

    /// Returns the line clamped into a source of `source_line_count` lines,
    /// or `None` when the source has no lines at all.
    pub fn display_line(&self, source_line_count: usize) -> Option<usize> {
        if source_line_count == 0 {
            None
        } else {
            Some(self.line.min(source_line_count - 1))
        }
    }
}
