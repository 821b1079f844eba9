//! Database schema migrations.
//!
//! Applies the initial schema: the conversations log and the
//! schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use deskbot_core::error::DeskbotError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental
/// changes.
pub fn run_migrations(conn: &Connection) -> Result<(), DeskbotError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| DeskbotError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| DeskbotError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: conversations");
    }

    Ok(())
}

/// Version 1: the per-session conversation log.
fn apply_v1(conn: &Connection) -> Result<(), DeskbotError> {
    conn.execute_batch(
        "
        -- Append-only message log, one row per turn.
        CREATE TABLE IF NOT EXISTS conversations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id  TEXT NOT NULL,
            sender      TEXT NOT NULL
                        CHECK (sender IN ('user', 'bot')),
            message     TEXT NOT NULL,
            timestamp   INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_session
            ON conversations (session_id, timestamp DESC);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'conversations');
        ",
    )
    .map_err(|e| DeskbotError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
