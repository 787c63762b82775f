//! Playback session handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use stepview_playback::Command;

use crate::error::ApiError;
use crate::schema::code::CodeRequest;
use crate::schema::sessions::{
    CreateSessionResponse, PlaybackAction, PlaybackRequest, SessionTraceResponse, SessionView,
};
use crate::session::{Session, SessionId};
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid session id '{}': expected UUID", raw)))
}

fn lookup(state: &AppState, raw: &str) -> Result<Arc<Session>, ApiError> {
    let id = parse_id(raw)?;
    state
        .sessions
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("session {} not found", id)))
}

/// `POST /sessions`
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let session = state.sessions.create();
    tracing::info!(session = %session.id, "session created");
    Ok(Json(CreateSessionResponse { id: session.id }))
}

/// `GET /sessions/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = lookup(&state, &id)?;
    Ok(Json(SessionView {
        id: session.id,
        playback: session.playback.snapshot(),
    }))
}

/// `DELETE /sessions/{id}`
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    if !state.sessions.remove(&id) {
        return Err(ApiError::NotFound(format!("session {} not found", id)));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `POST /sessions/{id}/trace`
///
/// Generates a trace and loads it into the session. A request overtaken by a
/// newer one on the same session is answered with 409 and loads nothing.
pub async fn load_trace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<SessionTraceResponse>, ApiError> {
    let session = lookup(&state, &id)?;
    let token = session.tokens.issue();
    let resolved = state.assistant.generate_trace(&req.code, &req.language).await;

    let playback = session
        .load_if_current(token, resolved.value)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("trace request superseded by a newer request".to_string())
        })?;
    Ok(Json(SessionTraceResponse {
        id: session.id,
        pattern: resolved.pattern,
        origin: resolved.origin,
        playback,
    }))
}

/// `POST /sessions/{id}/playback`
pub async fn control_playback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PlaybackRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = lookup(&state, &id)?;
    let playback = &session.playback;

    let snapshot = match req.action {
        PlaybackAction::StepForward => playback.send(Command::StepForward).await?,
        PlaybackAction::StepBackward => playback.send(Command::StepBackward).await?,
        PlaybackAction::JumpToStart => playback.send(Command::JumpToStart).await?,
        PlaybackAction::JumpToEnd => playback.send(Command::JumpToEnd).await?,
        PlaybackAction::Play => playback.send(Command::Play).await?,
        PlaybackAction::Pause => playback.send(Command::Pause).await?,
        PlaybackAction::Toggle => playback.send(Command::Toggle).await?,
        PlaybackAction::SetSpeed => {
            let speed = req
                .speed
                .ok_or_else(|| ApiError::BadRequest("set_speed requires 'speed'".to_string()))?;
            playback.set_speed(speed).await?
        }
    };

    Ok(Json(SessionView {
        id: session.id,
        playback: snapshot,
    }))
}
