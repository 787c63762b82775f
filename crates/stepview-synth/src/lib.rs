//! Trace synthesis for stepview.
//!
//! Deterministic builders for recognized algorithm shapes, canned offline
//! insights, and the remote code assistant with its resilient reply parser.
//! The assistant talks to the outside world only through [`ChatTransport`].

pub mod assistant;
pub mod builders;
pub mod canned;
pub mod parse;
pub mod prompts;
pub mod recognize;
pub mod tokens;
pub mod transport;

pub use assistant::{AnswerOutcome, CodeAssistant, FallbackReason, Origin, Resolved};
pub use builders::build_trace;
pub use canned::{canned_analysis, canned_answer, canned_explanation};
pub use parse::{parse_payload, ParseFailure, ParseStage, Parsed, Payload};
pub use tokens::{RequestToken, RequestTokens};
pub use transport::{ChatMessage, ChatReply, ChatRequest, ChatTransport, Offline, TransportError};
