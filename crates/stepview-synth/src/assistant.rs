//! The code assistant service: remote requests with layered fallback.
//!
//! [`CodeAssistant`] is passed explicitly to whoever needs it and owns no
//! global state. Every operation returns a value; transport and parse
//! failures are logged and recorded in the result's [`Origin`] instead of
//! being returned as errors.

use std::sync::Arc;

use serde::Serialize;
use stepview_core::{classify_with_rule, CodeAnalysis, CodeExplanation, CodePattern, ExecutionTrace};
use tracing::{debug, info, warn};

use crate::builders::build_trace;
use crate::canned::{canned_analysis, canned_answer, canned_explanation, DEFAULT_ANSWER};
use crate::parse::{extract_answer, parse_payload, ParseStage, Payload};
use crate::prompts;
use crate::tokens::RequestTokens;
use crate::transport::{envelope_content, ChatRequest, ChatTransport};

/// Message returned when a question needs the remote service and no canned
/// answer matches.
pub const UNAVAILABLE_MESSAGE: &str =
    "No API key is configured, and this question has no offline answer. Configure an API key to ask free-form questions about the code.";

/// Why the remote path was not used for a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum FallbackReason {
    NoCredential,
    Transport { message: String },
    Status { status: u16 },
    EmptyReply,
    Unparseable { message: String },
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NoCredential => write!(f, "no credential configured"),
            FallbackReason::Transport { message } => write!(f, "transport failed: {}", message),
            FallbackReason::Status { status } => write!(f, "remote returned status {}", status),
            FallbackReason::EmptyReply => write!(f, "remote reply had no content"),
            FallbackReason::Unparseable { message } => write!(f, "reply not parseable: {}", message),
        }
    }
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Origin {
    /// A deterministic builder for a recognized pattern.
    Deterministic,
    /// The remote reply, decoded by the given parse stage.
    Remote { stage: ParseStage },
    /// The offline default, after the remote path failed.
    Fallback { reason: FallbackReason },
    /// Blank source; nothing to trace.
    EmptySource,
}

impl Origin {
    pub fn is_remote(&self) -> bool {
        matches!(self, Origin::Remote { .. })
    }
}

/// A result together with the pattern of its source and its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub pattern: CodePattern,
    pub origin: Origin,
}

/// Outcome of a free-form question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Remote { answer: String },
    Canned { answer: String },
    Unavailable { message: String },
}

impl AnswerOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            AnswerOutcome::Remote { .. } => "remote",
            AnswerOutcome::Canned { .. } => "canned",
            AnswerOutcome::Unavailable { .. } => "unavailable",
        }
    }

    /// The answer text, or the unavailability message.
    pub fn text(&self) -> &str {
        match self {
            AnswerOutcome::Remote { answer } | AnswerOutcome::Canned { answer } => answer,
            AnswerOutcome::Unavailable { message } => message,
        }
    }
}

#[derive(Clone)]
pub struct CodeAssistant {
    transport: Arc<dyn ChatTransport>,
}

impl CodeAssistant {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        CodeAssistant { transport }
    }

    /// An assistant that never contacts a remote service.
    pub fn offline() -> Self {
        Self::new(Arc::new(crate::transport::Offline))
    }

    pub fn has_credential(&self) -> bool {
        self.transport.has_credential()
    }

    /// Produces a trace for `source`.
    ///
    /// Recognized patterns use their deterministic builder. Everything else
    /// goes to the remote service, falling back to the generic per-line
    /// builder. Blank source yields an empty trace.
    pub async fn generate_trace(&self, source: &str, language: &str) -> Resolved<ExecutionTrace> {
        if source.trim().is_empty() {
            debug!("blank source, returning empty trace");
            return Resolved {
                value: ExecutionTrace::empty(),
                pattern: CodePattern::Generic,
                origin: Origin::EmptySource,
            };
        }

        let (pattern, rule) = classify_with_rule(source);
        if pattern != CodePattern::Generic {
            info!(pattern = %pattern, rule = rule.map(|r| r.name), "using deterministic builder");
            return Resolved {
                value: build_trace(pattern, source),
                pattern,
                origin: Origin::Deterministic,
            };
        }

        let request = prompts::trace_request(source, language);
        self.resolve_remote(pattern, request, || build_trace(CodePattern::Generic, source))
            .await
    }

    /// Like [`generate_trace`](Self::generate_trace), but returns `None` when a
    /// newer request was issued on `tokens` while this one was in flight.
    ///
    /// The check happens once, on return. Callers that apply the trace
    /// somewhere shared must re-check the token where they apply it.
    pub async fn generate_latest(
        &self,
        tokens: &RequestTokens,
        source: &str,
        language: &str,
    ) -> Option<Resolved<ExecutionTrace>> {
        let token = tokens.issue();
        let resolved = self.generate_trace(source, language).await;
        if tokens.is_current(token) {
            Some(resolved)
        } else {
            debug!(token = token.value(), "discarding superseded trace");
            None
        }
    }

    pub async fn analyze(&self, source: &str, language: &str) -> Resolved<CodeAnalysis> {
        let pattern = stepview_core::classify(source);
        let request = prompts::analysis_request(source, language);
        self.resolve_remote(pattern, request, || canned_analysis(pattern))
            .await
    }

    pub async fn explain(&self, source: &str, language: &str) -> Resolved<CodeExplanation> {
        let pattern = stepview_core::classify(source);
        let request = prompts::explanation_request(source, language);
        self.resolve_remote(pattern, request, || canned_explanation(pattern, source))
            .await
    }

    /// Answers a free-form question about `source`.
    ///
    /// Without a credential only canned answers are available; if none
    /// matches the result is [`AnswerOutcome::Unavailable`]. With a credential
    /// a failed remote call falls back to a canned or default answer.
    pub async fn answer(&self, source: &str, language: &str, question: &str) -> AnswerOutcome {
        let pattern = stepview_core::classify(source);
        let canned = canned_answer(pattern, question);

        if !self.has_credential() {
            return match canned {
                Some(answer) => AnswerOutcome::Canned {
                    answer: answer.to_string(),
                },
                None => {
                    info!("question needs the remote service and no credential is configured");
                    AnswerOutcome::Unavailable {
                        message: UNAVAILABLE_MESSAGE.to_string(),
                    }
                }
            };
        }

        let request = prompts::answer_request(source, language, question);
        let fetched = self
            .fetch(request)
            .await
            .and_then(|content| extract_answer(&content).ok_or(FallbackReason::EmptyReply));
        match fetched {
            Ok(answer) => AnswerOutcome::Remote { answer },
            Err(reason) => {
                warn!(%reason, "answering from offline defaults");
                AnswerOutcome::Canned {
                    answer: canned.unwrap_or(DEFAULT_ANSWER).to_string(),
                }
            }
        }
    }

    async fn resolve_remote<T, F>(&self, pattern: CodePattern, request: ChatRequest, fallback: F) -> Resolved<T>
    where
        T: Payload,
        F: FnOnce() -> T,
    {
        let parsed = match self.fetch(request).await {
            Ok(content) => parse_payload::<T>(&content).map_err(|failure| FallbackReason::Unparseable {
                message: failure.to_string(),
            }),
            Err(reason) => Err(reason),
        };

        match parsed {
            Ok(parsed) => Resolved {
                value: parsed.value,
                pattern,
                origin: Origin::Remote { stage: parsed.stage },
            },
            Err(reason) => {
                match reason {
                    FallbackReason::NoCredential => debug!(kind = T::KIND, "no credential, using offline default"),
                    _ => warn!(kind = T::KIND, %reason, "using offline default"),
                }
                Resolved {
                    value: fallback(),
                    pattern,
                    origin: Origin::Fallback { reason },
                }
            }
        }
    }

    /// Runs one exchange and unwraps the assistant content.
    async fn fetch(&self, request: ChatRequest) -> Result<String, FallbackReason> {
        if !self.has_credential() {
            return Err(FallbackReason::NoCredential);
        }
        let reply = self
            .transport
            .exchange(request)
            .await
            .map_err(|err| FallbackReason::Transport {
                message: err.to_string(),
            })?;
        if !reply.ok {
            return Err(FallbackReason::Status {
                status: reply.status,
            });
        }
        envelope_content(&reply.text).ok_or(FallbackReason::EmptyReply)
    }
}
