//! Domain types shared across Deskbot crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Stable string form used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    /// Parse the stable string form. Unknown values return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Sender::User),
            "bot" => Some(Sender::Bot),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a session's conversation log.
///
/// Turns for a session are always handed out in chronological order; the
/// store may persist them in any order internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_round_trip() {
        assert_eq!(Sender::parse("user"), Some(Sender::User));
        assert_eq!(Sender::parse("bot"), Some(Sender::Bot));
        assert_eq!(Sender::parse("assistant"), None);
        assert_eq!(Sender::User.as_str(), "user");
        assert_eq!(Sender::Bot.as_str(), "bot");
    }

    #[test]
    fn test_sender_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        let s: Sender = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(s, Sender::Bot);
    }

    #[test]
    fn test_conversation_turn_serialization() {
        let turn = ConversationTurn {
            sender: Sender::User,
            message: "when are you open".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"sender\":\"user\""));
        assert!(json.contains("when are you open"));
    }
}
