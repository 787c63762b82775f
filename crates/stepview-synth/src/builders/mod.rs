//! Deterministic trace builders, one per [`CodePattern`].
//!
//! Each builder is a pure `&str -> ExecutionTrace` function with no failure
//! path: malformed or unrelated source still yields a plausible, well-formed,
//! non-empty trace for a canonical small input. Names, literals and line
//! positions are recognized from the source when possible and fall back to
//! fixed defaults otherwise.
//!
//! [`generic::build`] is the universal last resort for every other path.

pub mod generic;
pub mod merge_sort;
pub mod recursion;

use stepview_core::{CodePattern, ExecutionTrace};

/// Runs the builder registered for `pattern`.
pub fn build_trace(pattern: CodePattern, source: &str) -> ExecutionTrace {
    match pattern {
        CodePattern::FactorialLikeRecursion => recursion::factorial(source),
        CodePattern::FibonacciLikeRecursion => recursion::fibonacci(source),
        CodePattern::MergeSort => merge_sort::build(source),
        CodePattern::Generic => generic::build(source),
    }
}

/// Trimmed text of line `index`, or `fallback` when the source is shorter.
fn code_at(source: &str, index: usize, fallback: impl FnOnce() -> String) -> String {
    crate::recognize::line_text(source, index)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(fallback)
}
