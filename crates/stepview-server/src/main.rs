//! Binary entrypoint for the stepview HTTP server.
//!
//! Configuration comes from `STEPVIEW_*` environment variables; see
//! [`stepview_server::config`]. Log filtering honours `RUST_LOG`.

use stepview_server::config::ServerConfig;
use stepview_server::router::build_router;
use stepview_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    if !config.assistant.is_configured() {
        tracing::warn!("STEPVIEW_API_KEY not set; serving offline defaults only");
    }

    let state = AppState::new(&config)?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("stepview server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
