//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its inputs via axum extractors, interacts with
//! AppState services, and returns JSON responses. The chat handler owns the
//! persistence side effects: the user turn is saved before computing the
//! reply and the bot turn after, so the next request's history window sees
//! the full exchange.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use deskbot_core::types::Sender;

use crate::error::ApiError;
use crate::state::AppState;

/// How many turns the history endpoint returns at most.
pub const HISTORY_LIMIT: usize = 50;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sender: Sender,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub corpus_entries: u64,
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /chat - run one conversation turn.
///
/// Always answers 200 with natural-language text once validation passes;
/// internal failures surface as the orchestrator's degraded replies.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'session_id' must not be empty".to_string(),
        ));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Field 'message' must not be empty".to_string(),
        ));
    }
    if req.message.chars().count() > state.max_message_length {
        return Err(ApiError::BadRequest(format!(
            "Field 'message' exceeds maximum length of {} characters",
            state.max_message_length
        )));
    }

    // Persist the user turn first so this exchange is visible to the next
    // request even if the bot turn fails to save.
    if let Err(e) = state
        .conversations
        .append(&req.session_id, Sender::User, &req.message)
    {
        warn!(session_id = %req.session_id, error = %e, "Failed to persist user turn");
    }

    let response = state
        .orchestrator
        .get_response(&req.session_id, &req.message)
        .await;

    if let Err(e) = state
        .conversations
        .append(&req.session_id, Sender::Bot, &response)
    {
        warn!(session_id = %req.session_id, error = %e, "Failed to persist bot turn");
    }

    Ok(Json(ChatResponse { response }))
}

/// GET /history/{session_id} - most recent turns, chronological.
pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let turns = state.conversations.history(&session_id, HISTORY_LIMIT)?;

    let entries = turns
        .into_iter()
        .map(|turn| HistoryEntry {
            sender: turn.sender,
            message: turn.message,
        })
        .collect();

    Ok(Json(entries))
}

/// DELETE /history/{session_id} - clear all stored turns for a session.
///
/// Idempotent: clearing an unknown session succeeds.
pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    state.conversations.clear(&session_id)?;
    Ok(Json(ClearResponse { cleared: true }))
}

/// GET /health (and GET /) - service status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        corpus_entries: state.corpus.len() as u64,
    })
}
