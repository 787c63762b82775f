//! Seam between the assistant and whatever performs the chat exchange.
//!
//! The assistant only needs a credential-present signal and a call that
//! returns the raw reply. The HTTP implementation lives in the server crate;
//! tests use in-memory stubs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One chat message (`system` or `user`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body minus the model, which the transport supplies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Raw outcome of an exchange that reached the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub ok: bool,
    pub status: u16,
    pub text: String,
}

impl ChatReply {
    pub fn success(text: impl Into<String>) -> Self {
        ChatReply {
            ok: true,
            status: 200,
            text: text.into(),
        }
    }
}

/// The exchange never produced a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    #[error("no credential configured")]
    Unconfigured,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Whether a credential is available. Without one the assistant never
    /// calls [`ChatTransport::exchange`].
    fn has_credential(&self) -> bool;

    async fn exchange(&self, request: ChatRequest) -> Result<ChatReply, TransportError>;
}

/// Transport used when no remote service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

#[async_trait]
impl ChatTransport for Offline {
    fn has_credential(&self) -> bool {
        false
    }

    async fn exchange(&self, _request: ChatRequest) -> Result<ChatReply, TransportError> {
        Err(TransportError::Unconfigured)
    }
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Assistant content from a `{choices: [{message: {content}}]}` body.
///
/// Returns `None` when the body is not an envelope or the first choice has no
/// non-blank content.
pub fn envelope_content(body: &str) -> Option<String> {
    let envelope: ChatEnvelope = serde_json::from_str(body).ok()?;
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}
