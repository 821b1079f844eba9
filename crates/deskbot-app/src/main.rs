//! Deskbot application binary - composition root.
//!
//! Ties together all Deskbot crates into a single executable:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Check the LLM credential (fatal if missing)
//! 3. Load the embedding model and the FAQ corpus (fatal if unreadable)
//! 4. Open storage (SQLite conversation log)
//! 5. Assemble the orchestrator and start the axum API server

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use deskbot_api::routes;
use deskbot_api::state::AppState;
use deskbot_chat::ResponseOrchestrator;
use deskbot_core::config::DeskbotConfig;
use deskbot_llm::GeminiClient;
use deskbot_retrieval::{CorpusIndex, OnnxEmbeddingService};
use deskbot_storage::{ConversationRepository, Database};

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = DeskbotConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Deskbot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // LLM credential. Missing key is a startup failure, never a per-request
    // surprise.
    let api_key = match std::env::var("GOOGLE_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::error!("GOOGLE_API_KEY is not set — refusing to start");
            return Err("GOOGLE_API_KEY is not set".into());
        }
    };

    // Embedding model.
    let embedder = OnnxEmbeddingService::from_directory(Path::new(&config.embedding.model_dir))?;

    // FAQ corpus: load and embed once, before serving traffic.
    let corpus_path = args.resolve_corpus(&config.corpus.path);
    let corpus = Arc::new(
        CorpusIndex::load(
            &corpus_path,
            Box::new(embedder),
            config.corpus.similarity_threshold,
        )
        .await?,
    );
    tracing::info!(entries = corpus.len(), "FAQ corpus ready");

    // Storage.
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("chat_history.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite conversation log opened");

    let conversations = Arc::new(ConversationRepository::new(Arc::new(db)));

    // Completion client.
    let llm = GeminiClient::new(&config.llm, api_key)?;
    tracing::info!(model = %config.llm.model, "Completion client ready");

    // Orchestrator and API state.
    let orchestrator = Arc::new(ResponseOrchestrator::new(
        Arc::clone(&corpus),
        Arc::clone(&conversations),
        Box::new(llm),
        &config.chat,
    ));
    let state = AppState::new(orchestrator, conversations, corpus, &config.chat);

    // === API server ===

    let port = args.resolve_port(config.server.port);
    let addr = format!("127.0.0.1:{}", port);

    let router = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind — is another instance running?");
            tracing::error!("Try: deskbot --port {}", port + 1);
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
