//! Shared foundation for the Deskbot support-chat service.
//!
//! Holds the configuration model, the top-level error type, and the domain
//! types that cross crate boundaries (conversation turns and senders).

pub mod config;
pub mod error;
pub mod types;

pub use config::DeskbotConfig;
pub use error::{DeskbotError, Result};
pub use types::{ConversationTurn, Sender};
