//! Typed decoding of a parsed JSON value into a result shape.
//!
//! Decoding is lenient about field types and strict only about the keys that
//! identify the payload kind. Remote traces are sanitized into well-formed
//! steps here, so the trace model never sees malformed input.

use serde_json::{Map, Value};
use stepview_core::{
    CodeAnalysis, CodeExplanation, Complexity, ExecutionStep, ExecutionTrace, LineExplanation,
    Variables, ROOT_FRAME,
};

use super::ParseFailure;

/// Complexity reported when the remote analysis leaves a field blank.
pub const DEFAULT_COMPLEXITY: &str = "O(n)";

/// Keys that may hold the step array, in lookup order.
pub const TRACE_KEYS: [&str; 3] = ["executionTrace", "trace", "steps"];

/// A result shape that can be decoded from a JSON value.
pub trait Payload: Sized {
    /// Human-readable kind, used in diagnostics.
    const KIND: &'static str;

    fn from_json(value: &Value) -> Result<Self, ParseFailure>;
}

fn wrong_shape<T: Payload>() -> ParseFailure {
    ParseFailure::WrongShape { expected: T::KIND }
}

impl Payload for ExecutionTrace {
    const KIND: &'static str = "execution trace";

    fn from_json(value: &Value) -> Result<Self, ParseFailure> {
        let object = value.as_object().ok_or_else(wrong_shape::<Self>)?;
        let entries = TRACE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
            .ok_or_else(wrong_shape::<Self>)?;
        sanitize_steps(entries)
    }
}

impl Payload for CodeAnalysis {
    const KIND: &'static str = "code analysis";

    fn from_json(value: &Value) -> Result<Self, ParseFailure> {
        let object = value.as_object().ok_or_else(wrong_shape::<Self>)?;
        let explanation = non_empty_str(object.get("explanation")).ok_or_else(wrong_shape::<Self>)?;
        let complexity = object
            .get("complexity")
            .filter(|c| is_truthy(c))
            .ok_or_else(wrong_shape::<Self>)?;

        let complexity_field = |name: &str| {
            non_empty_str(complexity.get(name))
                .unwrap_or(DEFAULT_COMPLEXITY)
                .to_string()
        };

        Ok(CodeAnalysis {
            explanation: explanation.to_string(),
            complexity: Complexity {
                time: complexity_field("time"),
                space: complexity_field("space"),
            },
            suggestions: object
                .get("suggestions")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(render_text).collect())
                .unwrap_or_default(),
        })
    }
}

impl Payload for CodeExplanation {
    const KIND: &'static str = "code explanation";

    fn from_json(value: &Value) -> Result<Self, ParseFailure> {
        let object = value.as_object().ok_or_else(wrong_shape::<Self>)?;
        let summary = non_empty_str(object.get("summary"));
        let lines = object
            .get("lineByLineExplanation")
            .or_else(|| object.get("line_by_line_explanation"))
            .and_then(Value::as_array);

        if summary.is_none() && lines.is_none() {
            return Err(wrong_shape::<Self>());
        }

        Ok(CodeExplanation {
            summary: summary.unwrap_or_default().to_string(),
            line_by_line_explanation: lines
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|entry| LineExplanation {
                            line: entry.get("line").and_then(line_number).unwrap_or(0),
                            code: entry.get("code").and_then(render_text).unwrap_or_default(),
                            explanation: entry
                                .get("explanation")
                                .and_then(render_text)
                                .unwrap_or_default(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Free-text answer from a reply body.
///
/// Replies are plain prose; a JSON object with an `answer` string is unwrapped.
/// Blank replies yield `None`.
pub fn extract_answer(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(trimmed) {
        if let Some(answer) = non_empty_str(object.get("answer")) {
            return Some(answer.trim().to_string());
        }
    }
    Some(trimmed.to_string())
}

/// Converts remote step objects into well-formed steps.
///
/// Non-object entries are skipped. A missing or negative `line` and a missing
/// `output` carry over from the previous step, and an absent or empty call
/// stack becomes the root frame alone.
fn sanitize_steps(entries: &[Value]) -> Result<ExecutionTrace, ParseFailure> {
    let mut steps = Vec::with_capacity(entries.len());
    let mut previous_line = 0;
    let mut previous_output = String::new();

    for fields in entries.iter().filter_map(Value::as_object) {
        let line = fields.get("line").and_then(line_number).unwrap_or(previous_line);
        let output = fields
            .get("output")
            .and_then(render_text)
            .unwrap_or_else(|| previous_output.clone());

        let mut step = ExecutionStep::new(line, fields.get("code").and_then(render_text).unwrap_or_default())
            .with_variables(variables(fields))
            .with_call_stack(call_stack(fields))
            .with_output(output.clone());
        if let Some(explanation) = fields.get("explanation").and_then(Value::as_str) {
            step = step.with_explanation(explanation);
        }

        previous_line = line;
        previous_output = output;
        steps.push(step);
    }

    if steps.is_empty() {
        return Err(ParseFailure::EmptyTrace);
    }
    Ok(ExecutionTrace::new(steps))
}

fn variables(fields: &Map<String, Value>) -> Variables {
    fields
        .get("variables")
        .and_then(Value::as_object)
        .map(|vars| vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn call_stack(fields: &Map<String, Value>) -> Vec<String> {
    let frames: Vec<String> = match fields.get("callStack").or_else(|| fields.get("call_stack")) {
        Some(Value::Array(items)) => items.iter().filter_map(render_text).collect(),
        Some(Value::String(frame)) if !frame.trim().is_empty() => vec![frame.clone()],
        _ => Vec::new(),
    };
    if frames.is_empty() {
        vec![ROOT_FRAME.to_string()]
    } else {
        frames
    }
}

/// Non-negative integer from a number or numeric string.
fn line_number(value: &Value) -> Option<usize> {
    let raw = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    raw.and_then(|n| usize::try_from(n).ok())
}

/// Text form of a value; `null` has none.
fn render_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trace_prefers_execution_trace_key() {
        let value = json!({
            "steps": [{"line": 9}],
            "executionTrace": [{"line": 1, "code": "x = 1", "callStack": ["main"]}]
        });
        let trace = ExecutionTrace::from_json(&value).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.steps()[0].line, 1);
        assert_eq!(trace.steps()[0].code, "x = 1");
    }

    #[test]
    fn trace_accepts_alternate_keys() {
        let trace = ExecutionTrace::from_json(&json!({"trace": [{"line": 2}]})).unwrap();
        assert_eq!(trace.steps()[0].line, 2);
        let trace = ExecutionTrace::from_json(&json!({"steps": [{"line": 3}]})).unwrap();
        assert_eq!(trace.steps()[0].line, 3);
    }

    #[test]
    fn trace_requires_an_array_under_a_known_key() {
        assert_eq!(
            ExecutionTrace::from_json(&json!({"executionTrace": "nope"})),
            Err(ParseFailure::WrongShape { expected: "execution trace" })
        );
        assert!(matches!(
            ExecutionTrace::from_json(&json!([{"line": 1}])),
            Err(ParseFailure::WrongShape { .. })
        ));
    }

    #[test]
    fn sanitizes_remote_steps() {
        let value = json!({"executionTrace": [
            {"line": "4", "code": "a = 1", "variables": {"a": 1}, "callStack": [], "output": null},
            "garbage",
            {"line": -2, "call_stack": ["main", "f"], "variables": [1, 2], "output": 42},
            {"explanation": "done"}
        ]});
        let trace = ExecutionTrace::from_json(&value).unwrap();
        assert_eq!(trace.len(), 3);
        assert!(trace.is_well_formed());

        let first = &trace.steps()[0];
        assert_eq!(first.line, 4);
        assert_eq!(first.call_stack, vec!["main"]);
        assert_eq!(first.variables.get("a"), Some(&json!(1)));
        assert_eq!(first.output, "");

        let second = &trace.steps()[1];
        assert_eq!(second.line, 4);
        assert_eq!(second.call_stack, vec!["main", "f"]);
        assert!(second.variables.is_empty());
        assert_eq!(second.output, "42");

        let third = &trace.steps()[2];
        assert_eq!(third.line, 4);
        assert_eq!(third.output, "42");
        assert_eq!(third.explanation.as_deref(), Some("done"));
    }

    #[test]
    fn array_without_usable_steps_is_empty_trace() {
        assert_eq!(
            ExecutionTrace::from_json(&json!({"executionTrace": []})),
            Err(ParseFailure::EmptyTrace)
        );
        assert_eq!(
            ExecutionTrace::from_json(&json!({"executionTrace": [1, "two", null]})),
            Err(ParseFailure::EmptyTrace)
        );
    }

    #[test]
    fn analysis_fills_missing_complexity_fields() {
        let value = json!({
            "explanation": "Sorts things",
            "complexity": {"time": "O(n^2)"}
        });
        let analysis = CodeAnalysis::from_json(&value).unwrap();
        assert_eq!(analysis.complexity.time, "O(n^2)");
        assert_eq!(analysis.complexity.space, DEFAULT_COMPLEXITY);
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn analysis_requires_explanation_and_complexity() {
        assert!(CodeAnalysis::from_json(&json!({"explanation": "x"})).is_err());
        assert!(CodeAnalysis::from_json(&json!({"complexity": {}})).is_err());
        assert!(CodeAnalysis::from_json(&json!({"explanation": "", "complexity": {}})).is_err());
    }

    #[test]
    fn explanation_needs_summary_or_lines() {
        let explanation = CodeExplanation::from_json(&json!({
            "lineByLineExplanation": [{"line": "2", "code": "x = 1", "explanation": "assigns"}, 7]
        }))
        .unwrap();
        assert_eq!(explanation.summary, "");
        assert_eq!(explanation.line_by_line_explanation.len(), 1);
        assert_eq!(explanation.line_by_line_explanation[0].line, 2);

        assert!(CodeExplanation::from_json(&json!({"other": true})).is_err());
    }

    #[test]
    fn answer_text_is_trimmed_or_unwrapped() {
        assert_eq!(extract_answer("  It is O(n).  "), Some("It is O(n).".into()));
        assert_eq!(extract_answer(r#"{"answer": "Yes."}"#), Some("Yes.".into()));
        assert_eq!(extract_answer(r#"{"other": 1}"#), Some(r#"{"other": 1}"#.into()));
        assert_eq!(extract_answer("   "), None);
    }
}
