//! Plain-text rendering of steps and insights for the terminal.

use std::fmt::Write;

use stepview_core::{CodeAnalysis, CodeExplanation, ExecutionStep};

/// One step as a short block of lines.
///
/// `previous_output` is the output of the step before; only newly printed
/// text is shown.
pub fn step(index: usize, total: usize, step: &ExecutionStep, previous_output: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}/{}] line {}: {}", index + 1, total, step.line + 1, step.code);
    let _ = writeln!(out, "  stack: {}", step.call_stack.join(" > "));
    if !step.variables.is_empty() {
        let vars = step
            .variables
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "  vars:  {}", vars);
    }
    let fresh = step.output.strip_prefix(previous_output).unwrap_or(&step.output);
    for line in fresh.lines().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "  out:   {}", line);
    }
    if let Some(explanation) = &step.explanation {
        let _ = writeln!(out, "  # {}", explanation);
    }
    out
}

pub fn analysis(analysis: &CodeAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", analysis.explanation);
    let _ = writeln!(out, "Time complexity:  {}", analysis.complexity.time);
    let _ = writeln!(out, "Space complexity: {}", analysis.complexity.space);
    if !analysis.suggestions.is_empty() {
        let _ = writeln!(out, "\nSuggestions:");
        for suggestion in &analysis.suggestions {
            let _ = writeln!(out, "  - {}", suggestion);
        }
    }
    out
}

pub fn explanation(explanation: &CodeExplanation) -> String {
    let mut out = String::new();
    if !explanation.summary.is_empty() {
        let _ = writeln!(out, "{}\n", explanation.summary);
    }
    for line in &explanation.line_by_line_explanation {
        let _ = writeln!(out, "{:>4} | {}", line.line, line.code);
        let _ = writeln!(out, "     | {}", line.explanation);
    }
    out
}
