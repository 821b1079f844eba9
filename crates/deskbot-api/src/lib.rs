//! Deskbot API crate - axum HTTP server and route handlers.
//!
//! Exposes the chat endpoint, per-session history retrieval and deletion,
//! and a health check. The routing layer is thin plumbing around the chat
//! orchestrator and the conversation store.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
