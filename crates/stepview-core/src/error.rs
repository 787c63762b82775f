//! Core error types for stepview-core.

use thiserror::Error;

/// Reasons an [`ExecutionTrace`](crate::ExecutionTrace) is not well formed.
///
/// Produced by validation only. The model never corrects a trace; callers
/// sanitize input before constructing one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceViolation {
    /// A step has no call stack frames at all.
    #[error("step {index} has an empty call stack")]
    EmptyCallStack { index: usize },
}
