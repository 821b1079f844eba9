//! Repository for the per-session conversation log.
//!
//! The log is append-only: one row per turn, tagged user or bot. Reads
//! return the most recent N turns reconstructed into chronological order,
//! which is the exact window the prompt builder consumes.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use deskbot_core::error::DeskbotError;
use deskbot_core::types::{ConversationTurn, Sender};

use crate::db::Database;

/// SQLite-backed conversation store.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append one turn to a session's log. The timestamp is assigned by the
    /// database at insert time.
    pub fn append(
        &self,
        session_id: &str,
        sender: Sender,
        message: &str,
    ) -> Result<(), DeskbotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (session_id, sender, message)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![session_id, sender.as_str(), message],
            )
            .map_err(|e| DeskbotError::Storage(format!("Failed to append turn: {}", e)))?;
            Ok(())
        })
    }

    /// Fetch the most recent `limit` turns for a session, in chronological
    /// order.
    ///
    /// The query selects newest-first (with the rowid as a tiebreak for
    /// same-second turns) and reverses, so the window always holds the tail
    /// of the conversation.
    pub fn history(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, DeskbotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT sender, message, timestamp
                     FROM conversations
                     WHERE session_id = ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(|e| DeskbotError::Storage(format!("History query prepare: {}", e)))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id, limit as i64], |row| {
                    let sender: String = row.get(0)?;
                    let message: String = row.get(1)?;
                    let timestamp: i64 = row.get(2)?;
                    Ok((sender, message, timestamp))
                })
                .map_err(|e| DeskbotError::Storage(format!("History query: {}", e)))?;

            let mut turns = Vec::new();
            for row in rows {
                let (sender, message, timestamp) =
                    row.map_err(|e| DeskbotError::Storage(e.to_string()))?;
                let sender = Sender::parse(&sender).ok_or_else(|| {
                    DeskbotError::Storage(format!("Unknown sender in row: {}", sender))
                })?;
                turns.push(ConversationTurn {
                    sender,
                    message,
                    timestamp: Utc.timestamp_opt(timestamp, 0).single().unwrap_or_default(),
                });
            }

            // Queried newest-first; reverse into chronological order.
            turns.reverse();
            Ok(turns)
        })
    }

    /// Delete all turns for a session. Deleting an unknown session is a
    /// no-op.
    pub fn clear(&self, session_id: &str) -> Result<(), DeskbotError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM conversations WHERE session_id = ?1",
                rusqlite::params![session_id],
            )
            .map_err(|e| DeskbotError::Storage(format!("Failed to clear session: {}", e)))?;
            Ok(())
        })
    }

    /// Count stored turns for a session.
    pub fn count(&self, session_id: &str) -> Result<u64, DeskbotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM conversations WHERE session_id = ?1",
                    rusqlite::params![session_id],
                    |row| row.get(0),
                )
                .map_err(|e| DeskbotError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}
