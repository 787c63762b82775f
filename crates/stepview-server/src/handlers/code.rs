//! Stateless code endpoints: trace, analyze, explain, answer.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::schema::code::{
    AnalyzeResponse, AnswerResponse, CodeRequest, ExplainResponse, QuestionRequest, TraceResponse,
};
use crate::state::AppState;

/// `POST /trace`
pub async fn trace(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<TraceResponse>, ApiError> {
    let resolved = state.assistant.generate_trace(&req.code, &req.language).await;
    Ok(Json(TraceResponse {
        pattern: resolved.pattern,
        origin: resolved.origin,
        steps: resolved.value,
    }))
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let resolved = state.assistant.analyze(&req.code, &req.language).await;
    Ok(Json(AnalyzeResponse {
        pattern: resolved.pattern,
        origin: resolved.origin,
        analysis: resolved.value,
    }))
}

/// `POST /explain`
pub async fn explain(
    State(state): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let resolved = state.assistant.explain(&req.code, &req.language).await;
    Ok(Json(ExplainResponse {
        pattern: resolved.pattern,
        origin: resolved.origin,
        explanation: resolved.value,
    }))
}

/// `POST /answer`
pub async fn answer(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }
    let outcome = state
        .assistant
        .answer(&req.code, &req.language, &req.question)
        .await;
    Ok(Json(AnswerResponse {
        status: outcome.status(),
        answer: outcome.text().to_string(),
    }))
}
