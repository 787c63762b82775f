//! Router assembly for the stepview HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Routes use axum 0.8 `/{param}` path syntax. TraceLayer provides
/// request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Stateless code endpoints
        .route("/trace", post(handlers::code::trace))
        .route("/analyze", post(handlers::code::analyze))
        .route("/explain", post(handlers::code::explain))
        .route("/answer", post(handlers::code::answer))
        // Playback sessions
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/sessions/{id}/trace",
            post(handlers::sessions::load_trace),
        )
        .route(
            "/sessions/{id}/playback",
            post(handlers::sessions::control_playback),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
