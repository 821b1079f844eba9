//! Deskbot storage crate - SQLite persistence for conversation history.
//!
//! Provides a WAL-mode SQLite database with migrations and the
//! append-only per-session conversation log the chat pipeline reads
//! its history from.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::ConversationRepository;
