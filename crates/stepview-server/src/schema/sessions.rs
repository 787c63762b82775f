//! Schema types for playback sessions.

use serde::{Deserialize, Serialize};
use stepview_core::CodePattern;
use stepview_playback::PlaybackSnapshot;
use stepview_synth::Origin;

use crate::session::SessionId;

#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub id: SessionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub playback: PlaybackSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionTraceResponse {
    pub id: SessionId,
    pub pattern: CodePattern,
    pub origin: Origin,
    pub playback: PlaybackSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    StepForward,
    StepBackward,
    JumpToStart,
    JumpToEnd,
    Play,
    Pause,
    Toggle,
    SetSpeed,
}

/// A transport control. `speed` is required for `set_speed`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackRequest {
    pub action: PlaybackAction,
    #[serde(default)]
    pub speed: Option<f64>,
}
