//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Duration;

use stepview_synth::{ChatTransport, CodeAssistant};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::llm_provider::HttpChatTransport;
use crate::session::SessionRegistry;

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    /// The code assistant (remote calls with offline fallback).
    pub assistant: CodeAssistant,
    /// Playback sessions keyed by id.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Builds state from configuration and starts the idle-session sweep.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let transport = HttpChatTransport::new(config.assistant.clone())?;
        let state = Self::with_transport(Arc::new(transport));
        state.sessions.start_sweep(config.session_ttl, SWEEP_INTERVAL);
        Ok(state)
    }

    /// State backed by the given transport, with no background sweep.
    pub fn with_transport(transport: Arc<dyn ChatTransport>) -> Self {
        AppState {
            assistant: CodeAssistant::new(transport),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }

    /// State that never contacts a remote service (for testing).
    pub fn offline() -> Self {
        Self::with_transport(Arc::new(stepview_synth::Offline))
    }
}
