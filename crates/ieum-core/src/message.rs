//! Chat message types shared by the controller, the backend client and the
//! transcript.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

impl Sender {
    /// Returns the wire role for this sender.
    pub fn as_role(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_role())
    }
}

/// A rendered chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    sender: Sender,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }
}

/// Stored message as returned by `GET /chat/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub content: String,
    pub role: Sender,
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Message::new(stored.content, stored.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_message_roles() {
        let user: StoredMessage =
            serde_json::from_str(r#"{"content":"hi","role":"user"}"#).unwrap();
        assert_eq!(Message::from(user), Message::user("hi"));

        let bot: StoredMessage =
            serde_json::from_str(r#"{"content":"hello","role":"bot"}"#).unwrap();
        assert!(Message::from(bot).is_bot());
    }

    #[test]
    fn test_assistant_role_is_bot() {
        let stored: StoredMessage =
            serde_json::from_str(r#"{"content":"x","role":"assistant"}"#).unwrap();
        assert_eq!(stored.role, Sender::Bot);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = serde_json::from_str::<StoredMessage>(r#"{"content":"x","role":"system"}"#);
        assert!(result.is_err());
    }
}
