//! UI-agnostic chat message types
//!
//! Shared between the core state machine and any rendering frontend;
//! nothing here depends on a UI framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unit of conversation, authored by the user or the bot.
///
/// Serialized field names match the persisted history records
/// (`isError`, omitted when false).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    /// Set only on bot messages that stand in for a failed exchange.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Message {
    fn new(content: impl Into<String>, sender: Sender, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            is_error,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User, false)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Bot, false)
    }

    /// A bot message standing in for a failed exchange.
    pub fn bot_error(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Bot, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_with_stored_record_names() {
        let msg = Message::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["content"], "hello");
        // isError is omitted entirely unless set
        assert!(json.get("isError").is_none());

        let err = Message::bot_error("oops");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["isError"], true);
    }

    #[test]
    fn deserializes_records_without_error_flag() {
        let json = r#"{
            "id": "6f8a2b1e-3c4d-4e5f-8a9b-0c1d2e3f4a5b",
            "content": "Hi there",
            "sender": "bot",
            "timestamp": "2024-01-15T10:30:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender, Sender::Bot);
        assert!(!msg.is_error);
    }

    #[test]
    fn round_trips_through_json() {
        let original = Message::bot_error("failed");
        let json = serde_json::to_string(&original).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(original, restored);
    }
}
