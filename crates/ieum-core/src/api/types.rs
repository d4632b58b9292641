//! Wire types for the chat backend.

use serde::{Deserialize, Serialize};

use crate::message::StoredMessage;

/// `POST /chat/ask/` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    /// Echo of the question (the backend includes it; not required).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// `POST /chat/new/` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewConversation {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// One entry of `GET /chat/list/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ConversationList {
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ConversationDetail {
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}
