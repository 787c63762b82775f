//! Resilient extraction of typed results from untrusted reply text.
//!
//! The reply is tried against an ordered list of strategies and the first
//! success wins:
//!
//! 1. [`ParseStage::Direct`]: the whole body as JSON.
//! 2. [`ParseStage::Fenced`]: the first fenced block labeled `json`.
//! 3. [`ParseStage::Embedded`]: the first balanced top-level `{...}` span.
//!
//! A body that is valid JSON of the wrong shape ends the chain: the reply was
//! structured, just not as asked. Nothing here panics or performs I/O; callers
//! turn a final [`ParseFailure`] into their offline default.

pub mod extract;
pub mod payload;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub use payload::{extract_answer, Payload};

/// Why one parse strategy (or the whole chain) failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON is not a {expected} payload")]
    WrongShape { expected: &'static str },

    #[error("no JSON candidate found in text")]
    NoJsonFound,

    #[error("trace payload contained no usable steps")]
    EmptyTrace,

    #[error("every parse strategy failed, last: {last}")]
    Exhausted { last: Box<ParseFailure> },
}

impl ParseFailure {
    /// Whether this failure stops the strategy chain.
    ///
    /// Only a missing or syntactically broken candidate lets the next
    /// strategy run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseFailure::WrongShape { .. } | ParseFailure::EmptyTrace)
    }
}

/// The strategy that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Direct,
    Fenced,
    Embedded,
}

impl ParseStage {
    pub const ORDER: [ParseStage; 3] = [ParseStage::Direct, ParseStage::Fenced, ParseStage::Embedded];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStage::Direct => "direct",
            ParseStage::Fenced => "fenced",
            ParseStage::Embedded => "embedded",
        }
    }

    /// Runs this stage's strategy on `text`.
    pub fn attempt<T: Payload>(&self, text: &str) -> Result<T, ParseFailure> {
        match self {
            ParseStage::Direct => decode(text),
            ParseStage::Fenced => extract::fenced_json(text)
                .ok_or(ParseFailure::NoJsonFound)
                .and_then(decode),
            ParseStage::Embedded => extract::first_object(text)
                .ok_or(ParseFailure::NoJsonFound)
                .and_then(decode),
        }
    }
}

impl std::fmt::Display for ParseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded payload and the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub stage: ParseStage,
}

/// Returns the first successful strategy result.
///
/// Strategies run in order. A terminal failure stops the chain immediately;
/// otherwise the last failure is reported inside
/// [`ParseFailure::Exhausted`].
pub fn first_success<T, I, F>(strategies: I, mut run: F) -> Result<(ParseStage, T), ParseFailure>
where
    I: IntoIterator<Item = ParseStage>,
    F: FnMut(ParseStage) -> Result<T, ParseFailure>,
{
    let mut last = ParseFailure::NoJsonFound;
    for stage in strategies {
        match run(stage) {
            Ok(value) => return Ok((stage, value)),
            Err(failure) if failure.is_terminal() => {
                debug!(stage = %stage, %failure, "parse chain stopped");
                return Err(failure);
            }
            Err(failure) => {
                debug!(stage = %stage, %failure, "parse stage failed");
                last = failure;
            }
        }
    }
    Err(ParseFailure::Exhausted { last: Box::new(last) })
}

/// Extracts a `T` from `text` using the full strategy chain.
pub fn parse_payload<T: Payload>(text: &str) -> Result<Parsed<T>, ParseFailure> {
    match first_success(ParseStage::ORDER, |stage| stage.attempt::<T>(text)) {
        Ok((stage, value)) => {
            debug!(kind = T::KIND, stage = %stage, "parsed remote payload");
            Ok(Parsed { value, stage })
        }
        Err(failure) => {
            warn!(kind = T::KIND, %failure, "could not parse remote payload");
            Err(failure)
        }
    }
}

fn decode<T: Payload>(candidate: &str) -> Result<T, ParseFailure> {
    let value: serde_json::Value = serde_json::from_str(candidate)
        .map_err(|err| ParseFailure::InvalidJson(err.to_string()))?;
    T::from_json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stepview_core::{CodeAnalysis, CodeExplanation, ExecutionTrace};

    const TRACE_JSON: &str =
        r#"{"executionTrace": [{"line": 0, "code": "x = 1", "variables": {"x": 1}, "callStack": ["main"], "output": ""}]}"#;

    #[test]
    fn direct_json_with_expected_shape() {
        let parsed = parse_payload::<ExecutionTrace>(TRACE_JSON).unwrap();
        assert_eq!(parsed.stage, ParseStage::Direct);
        assert_eq!(parsed.value.len(), 1);
        assert!(parsed.value.is_well_formed());
    }

    #[test]
    fn direct_json_with_wrong_shape_stops_the_chain() {
        let failure = parse_payload::<ExecutionTrace>(r#"{"message": "I cannot trace this"}"#).unwrap_err();
        assert_eq!(failure, ParseFailure::WrongShape { expected: "execution trace" });
    }

    #[test]
    fn fenced_block_inside_prose() {
        let reply = format!("Sure! ```json\n{TRACE_JSON}\n```");
        let parsed = parse_payload::<ExecutionTrace>(&reply).unwrap();
        assert_eq!(parsed.stage, ParseStage::Fenced);
        assert_eq!(parsed.value.steps()[0].code, "x = 1");
    }

    #[test]
    fn bare_object_inside_prose() {
        let reply = format!("Here is the trace: {TRACE_JSON} Let me know!");
        let parsed = parse_payload::<ExecutionTrace>(&reply).unwrap();
        assert_eq!(parsed.stage, ParseStage::Embedded);
    }

    #[test]
    fn pure_prose_is_exhausted() {
        let failure = parse_payload::<ExecutionTrace>("I am unable to help with that.").unwrap_err();
        assert_eq!(
            failure,
            ParseFailure::Exhausted { last: Box::new(ParseFailure::NoJsonFound) }
        );
    }

    #[test]
    fn empty_reply_is_exhausted() {
        assert!(matches!(
            parse_payload::<CodeAnalysis>(""),
            Err(ParseFailure::Exhausted { .. })
        ));
    }

    #[test]
    fn broken_fenced_block_is_exhausted() {
        let reply = "Result:\n```json\n{oops}\n```";
        let failure = parse_payload::<CodeExplanation>(reply).unwrap_err();
        assert!(matches!(
            failure,
            ParseFailure::Exhausted { last } if matches!(*last, ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn empty_step_array_in_fence_is_terminal() {
        let reply = "```json\n{\"executionTrace\": []}\n```";
        assert_eq!(
            parse_payload::<ExecutionTrace>(reply).unwrap_err(),
            ParseFailure::EmptyTrace
        );
    }

    #[test]
    fn first_success_reports_last_failure() {
        let result: Result<(ParseStage, ()), _> = first_success(ParseStage::ORDER, |stage| match stage {
            ParseStage::Embedded => Err(ParseFailure::InvalidJson("eof".into())),
            _ => Err(ParseFailure::NoJsonFound),
        });
        assert_eq!(
            result.unwrap_err(),
            ParseFailure::Exhausted { last: Box::new(ParseFailure::InvalidJson("eof".into())) }
        );
    }

    proptest! {
        #[test]
        fn parser_never_panics_and_yields_well_formed_traces(text in ".{0,200}") {
            if let Ok(parsed) = parse_payload::<ExecutionTrace>(&text) {
                prop_assert!(!parsed.value.is_empty());
                prop_assert!(parsed.value.is_well_formed());
            }
            let _ = parse_payload::<CodeAnalysis>(&text);
            let _ = parse_payload::<CodeExplanation>(&text);
        }

        #[test]
        fn wrapped_trace_survives_arbitrary_prose(prefix in "[a-zA-Z .!?]{0,40}", suffix in "[a-zA-Z .!?]{0,40}") {
            let reply = format!("{prefix}```json\n{TRACE_JSON}\n```{suffix}");
            let parsed = parse_payload::<ExecutionTrace>(&reply).unwrap();
            prop_assert_eq!(parsed.value.len(), 1);
        }
    }
}
