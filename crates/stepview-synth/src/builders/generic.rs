//! Line-by-line fallback trace.

use stepview_core::{ExecutionStep, ExecutionTrace};

use crate::recognize::non_blank_lines;

/// Placeholder binding shown on every generic step.
pub const PLACEHOLDER_VARIABLE: (&str, &str) = ("example", "value");

/// One top-level step per non-blank source line, in source order.
///
/// Source without any non-blank line still yields a single step at line 0.
pub fn build(source: &str) -> ExecutionTrace {
    let (name, value) = PLACEHOLDER_VARIABLE;
    let mut steps: Vec<ExecutionStep> = non_blank_lines(source)
        .map(|(index, line)| {
            ExecutionStep::new(index, line.trim())
                .with_variable(name, value)
                .with_explanation(format!("Executing line {}", index + 1))
        })
        .collect();

    if steps.is_empty() {
        steps.push(
            ExecutionStep::new(0, "")
                .with_variable(name, value)
                .with_explanation("No executable lines"),
        );
    }

    ExecutionTrace::new(steps)
}
