//! OpenAI-compatible chat transport over reqwest.

use async_trait::async_trait;
use serde_json::json;
use stepview_synth::{ChatReply, ChatRequest, ChatTransport, TransportError};
use tracing::debug;

use crate::config::AssistantConfig;
use crate::error::ApiError;

/// Posts chat requests to `{base_url}/chat/completions` with Bearer auth.
pub struct HttpChatTransport {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl HttpChatTransport {
    pub fn new(config: AssistantConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::InternalError(format!("http client setup failed: {}", err)))?;
        Ok(HttpChatTransport {
            client,
            config: config.normalize(),
        })
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn body(&self, request: &ChatRequest) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    fn has_credential(&self) -> bool {
        self.config.is_configured()
    }

    async fn exchange(&self, request: ChatRequest) -> Result<ChatReply, TransportError> {
        let api_key = self.config.api_key.as_deref().ok_or(TransportError::Unconfigured)?;
        let endpoint = self.config.endpoint();
        debug!(%endpoint, model = %self.config.model, "sending chat request");

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.body(&request))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), bytes = text.len(), "chat response received");

        Ok(ChatReply {
            ok: status.is_success(),
            status: status.as_u16(),
            text,
        })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepview_synth::prompts;

    #[test]
    fn body_carries_model_and_sampling() {
        let transport = HttpChatTransport::new(AssistantConfig {
            model: "tiny".into(),
            ..AssistantConfig::default()
        })
        .unwrap();
        let body = transport.body(&prompts::analysis_request("x = 1", "python"));
        assert_eq!(body["model"], "tiny");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn missing_key_never_sends() {
        let transport = HttpChatTransport::new(AssistantConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            ..AssistantConfig::default()
        })
        .unwrap();
        assert!(!transport.has_credential());
        let result = transport.exchange(prompts::trace_request("x", "python")).await;
        assert_eq!(result, Err(TransportError::Unconfigured));
    }
}
