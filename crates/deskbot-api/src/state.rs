//! Application state shared across all route handlers.
//!
//! AppState holds references to the orchestrator and its collaborators.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use deskbot_chat::ResponseOrchestrator;
use deskbot_core::config::ChatConfig;
use deskbot_retrieval::CorpusIndex;
use deskbot_storage::ConversationRepository;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks; everything
/// reachable from here is read-only or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    /// The per-request response pipeline.
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Per-session conversation log.
    pub conversations: Arc<ConversationRepository>,
    /// Loaded FAQ corpus (for health reporting).
    pub corpus: Arc<CorpusIndex>,
    /// Maximum accepted user message length in characters.
    pub max_message_length: usize,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(
        orchestrator: Arc<ResponseOrchestrator>,
        conversations: Arc<ConversationRepository>,
        corpus: Arc<CorpusIndex>,
        chat_config: &ChatConfig,
    ) -> Self {
        Self {
            orchestrator,
            conversations,
            corpus,
            max_message_length: chat_config.max_message_length,
            start_time: Instant::now(),
        }
    }
}
