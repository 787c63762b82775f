//! Core data model for stepview.
//!
//! Holds the synthesized execution trace types, the code pattern classifier
//! that selects a trace generation strategy, and the result shapes produced
//! by the remote code assistant. Everything here is pure data plus
//! validation; nothing performs I/O.

pub mod error;
pub mod insight;
pub mod pattern;
pub mod step;
pub mod trace;

// Re-export commonly used types
pub use error::TraceViolation;
pub use insight::{CodeAnalysis, CodeExplanation, Complexity, LineExplanation};
pub use pattern::{classify, classify_with_rule, CodePattern, PatternRule};
pub use step::{ExecutionStep, Variables, ROOT_FRAME};
pub use trace::ExecutionTrace;
