//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, and body limits. CORS is
//! permissive: the chat frontend is served from a different origin and the
//! API carries no credentials (sessions are opaque client-chosen ids).

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use deskbot_core::error::DeskbotError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route(
            "/history/{session_id}",
            get(handlers::history).delete(handlers::clear_history),
        )
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the given port.
///
/// Binds to 127.0.0.1 (localhost only).
pub async fn start_server(port: u16, state: AppState) -> Result<(), DeskbotError> {
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DeskbotError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| DeskbotError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
