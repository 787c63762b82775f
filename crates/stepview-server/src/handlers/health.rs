use axum::extract::State;
use axum::Json;

use crate::schema::code::HealthResponse;
use crate::state::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        credential: state.assistant.has_credential(),
    })
}
