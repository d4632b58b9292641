//! Chat backend HTTP API.
//!
//! Endpoints (relative to the configured base URL):
//! - `POST /chat/ask/` (form `question`) → `{ answer }`
//! - `POST /chat/new/` → `{ conversation_id }`
//! - `GET /chat/list/` → `{ conversations: [{ id, title, createdAt }] }`
//! - `GET /chat/{id}/` → `{ messages: [{ content, role }] }`
//! - `POST /chat/{id}/rename/` (form `title`), `POST /chat/{id}/delete/`
//! - `POST /chat/search-policy/` (JSON filters)

mod client;
mod error;
mod types;

pub use client::{BackendClient, USER_AGENT};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use types::{AskResponse, ConversationSummary, NewConversation};
