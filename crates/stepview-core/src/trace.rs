//! The ordered, immutable sequence of synthesized execution steps.
//!
//! An [`ExecutionTrace`] is shared by reference between the generator and the
//! playback layer. It is never mutated once built: regeneration produces a new
//! trace, so a holder of an old trace and a stale step index never observes a
//! half-replaced sequence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::TraceViolation;
use crate::step::ExecutionStep;

/// Ordered, finite, immutable sequence of [`ExecutionStep`]s.
///
/// Index 0 (if present) is the first observable state and the last index is
/// program termination. Cloning is cheap (reference counted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTrace(Arc<[ExecutionStep]>);

impl ExecutionTrace {
    pub fn new(steps: Vec<ExecutionStep>) -> Self {
        ExecutionTrace(Arc::from(steps))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&ExecutionStep> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&ExecutionStep> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&ExecutionStep> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionStep> {
        self.0.iter()
    }

    /// Index of the terminating step, or 0 for an empty trace.
    pub fn last_index(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Clamps `index` into `[0, len - 1]`; an empty trace pins it at 0.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Checks the structural invariants of every step.
    ///
    /// Line indices are unsigned so `line >= 0` holds by construction; the
    /// remaining invariant is a non-empty call stack.
    pub fn validate(&self) -> Result<(), TraceViolation> {
        match self.0.iter().position(|step| step.call_stack.is_empty()) {
            Some(index) => Err(TraceViolation::EmptyCallStack { index }),
            None => Ok(()),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.validate().is_ok()
    }

    /// True when output length never shrinks from one step to the next.
    ///
    /// Not enforced by the model; deterministic builders honor it.
    pub fn output_is_monotonic(&self) -> bool {
        self.0
            .windows(2)
            .all(|pair| pair[1].output.len() >= pair[0].output.len())
    }

    /// True when both handles point at the same underlying steps.
    pub fn ptr_eq(&self, other: &ExecutionTrace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<ExecutionStep>> for ExecutionTrace {
    fn from(steps: Vec<ExecutionStep>) -> Self {
        Self::new(steps)
    }
}

impl<'a> IntoIterator for &'a ExecutionTrace {
    type Item = &'a ExecutionStep;
    type IntoIter = std::slice::Iter<'a, ExecutionStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Free-function form of [`ExecutionTrace::is_well_formed`].
pub fn is_well_formed_trace(trace: &ExecutionTrace) -> bool {
    trace.is_well_formed()
}

/// Free-function form of [`ExecutionTrace::clamp_index`].
pub fn clamp_index(trace: &ExecutionTrace, index: usize) -> usize {
    trace.clamp_index(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(len: usize) -> ExecutionTrace {
        (0..len)
            .map(|i| ExecutionStep::new(i, format!("line {i}")).with_output("x".repeat(i)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn empty_trace_is_well_formed_and_pins_index() {
        let trace = ExecutionTrace::empty();
        assert!(trace.is_well_formed());
        assert_eq!(trace.clamp_index(0), 0);
        assert_eq!(trace.clamp_index(42), 0);
        assert!(trace.first().is_none());
    }

    #[test]
    fn empty_call_stack_is_reported_with_its_index() {
        let trace = ExecutionTrace::new(vec![
            ExecutionStep::new(0, "a"),
            ExecutionStep::new(1, "b").with_call_stack(Vec::new()),
        ]);
        assert_eq!(
            trace.validate(),
            Err(TraceViolation::EmptyCallStack { index: 1 })
        );
        assert!(!is_well_formed_trace(&trace));
    }

    #[test]
    fn clamp_index_bounds_to_last_step() {
        let trace = sample(4);
        assert_eq!(clamp_index(&trace, 2), 2);
        assert_eq!(clamp_index(&trace, 3), 3);
        assert_eq!(clamp_index(&trace, 9), 3);
    }

    #[test]
    fn output_monotonicity_detects_shrinking_output() {
        assert!(sample(5).output_is_monotonic());
        let shrinking = ExecutionTrace::new(vec![
            ExecutionStep::new(0, "").with_output("abc"),
            ExecutionStep::new(1, "").with_output("a"),
        ]);
        assert!(!shrinking.output_is_monotonic());
    }

    #[test]
    fn clones_share_storage() {
        let trace = sample(3);
        let other = trace.clone();
        assert!(trace.ptr_eq(&other));
        assert!(!trace.ptr_eq(&sample(3)));
        assert_eq!(trace, sample(3));
    }

    #[test]
    fn serializes_as_plain_array() {
        let trace = sample(2);
        let value = serde_json::to_value(&trace).unwrap();
        assert!(value.is_array());
        let back: ExecutionTrace = serde_json::from_value(value).unwrap();
        assert_eq!(back.len(), 2);
    }

    proptest! {
        #[test]
        fn clamped_index_is_always_in_range(len in 0usize..20, index in 0usize..100) {
            let trace = sample(len);
            let clamped = trace.clamp_index(index);
            if len == 0 {
                prop_assert_eq!(clamped, 0);
            } else {
                prop_assert!(clamped < len);
            }
        }
    }
}
