//! Conversation history sidebar.
//!
//! Backend failures here are logged and absorbed: the list falls back to
//! empty, renames and deletes still update the local list where it makes
//! sense, and starting a new conversation always resets the view.

use unicode_segmentation::UnicodeSegmentation;

use crate::api::{ApiErrorKind, BackendClient, ConversationSummary};
use crate::dispatch::{DispatchState, RenderSink, reducer};

/// Title shown for conversations without one.
pub const DEFAULT_TITLE: &str = "새 대화";

/// Text shown when the list is empty.
pub const EMPTY_LIST: &str = "대화 기록이 없습니다";

const TITLE_LIMIT: usize = 20;

/// Sidebar title: default when missing, cut to 20 characters otherwise.
pub fn display_title(title: Option<&str>) -> String {
    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => return DEFAULT_TITLE.to_string(),
    };
    let mut graphemes = title.graphemes(true);
    let head: String = graphemes.by_ref().take(TITLE_LIMIT).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: String,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub current_id: Option<String>,
    pub items: Vec<ConversationSummary>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display rows, with the current conversation marked active.
    pub fn entries(&self) -> Vec<ConversationEntry> {
        self.items
            .iter()
            .map(|item| ConversationEntry {
                id: item.id.clone(),
                title: display_title(item.title.as_deref()),
                active: self.current_id.as_deref() == Some(item.id.as_str()),
            })
            .collect()
    }

    fn is_current(&self, id: &str) -> bool {
        self.current_id.as_deref() == Some(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Title was blank; nothing was sent.
    Skipped,
    Renamed,
    /// Backend refused; only the local entry changed.
    RenamedLocally,
    Failed,
}

/// Reloads the conversation list. Any failure yields an empty list.
pub async fn load_list(client: &BackendClient, state: &mut ConversationState) {
    state.items = match client.list_conversations().await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(kind = %err.kind, "failed to load conversations: {err}");
            Vec::new()
        }
    };
}

/// Starts a new conversation and resets the view.
///
/// Returns the new conversation id, if the backend provided one.
pub async fn new_conversation<S>(
    client: &BackendClient,
    state: &mut ConversationState,
    dispatch: &mut DispatchState,
    sink: &mut S,
) -> Option<String>
where
    S: RenderSink + ?Sized,
{
    match client.create_conversation().await {
        Ok(created) => {
            let id = created.conversation_id.as_deref().unwrap_or("");
            tracing::info!(id, "conversation created");
            state.current_id = created.conversation_id;
        }
        Err(err) => tracing::warn!(kind = %err.kind, "failed to create conversation: {err}"),
    }

    reset_view(dispatch, sink);
    load_list(client, state).await;
    state.current_id.clone()
}

/// Loads `id` into the sink. On failure the view is left untouched.
pub async fn open<S>(
    client: &BackendClient,
    state: &mut ConversationState,
    dispatch: &mut DispatchState,
    sink: &mut S,
    id: &str,
) -> bool
where
    S: RenderSink + ?Sized,
{
    state.current_id = Some(id.to_string());

    let messages = match client.load_conversation(id).await {
        Ok(messages) => messages,
        Err(err) => {
            tracing::warn!(id, kind = %err.kind, "failed to load conversation: {err}");
            return false;
        }
    };

    reducer::abandon(dispatch);
    sink.clear();
    sink.hide_idle_view();
    for message in messages {
        sink.append(message);
    }
    tracing::debug!(id, "conversation opened");
    true
}

pub async fn rename(
    client: &BackendClient,
    state: &mut ConversationState,
    id: &str,
    title: &str,
) -> RenameOutcome {
    let title = title.trim();
    if title.is_empty() {
        return RenameOutcome::Skipped;
    }

    match client.rename_conversation(id, title).await {
        Ok(()) => {
            load_list(client, state).await;
            RenameOutcome::Renamed
        }
        Err(err) if err.kind == ApiErrorKind::HttpStatus => {
            tracing::warn!(id, "rename rejected, renaming locally: {err}");
            if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                item.title = Some(title.to_string());
            }
            RenameOutcome::RenamedLocally
        }
        Err(err) => {
            tracing::warn!(id, kind = %err.kind, "failed to rename conversation: {err}");
            RenameOutcome::Failed
        }
    }
}

/// Deletes `id`. The entry is removed locally unless the request never
/// reached the backend.
pub async fn delete<S>(
    client: &BackendClient,
    state: &mut ConversationState,
    dispatch: &mut DispatchState,
    sink: &mut S,
    id: &str,
) -> bool
where
    S: RenderSink + ?Sized,
{
    match client.delete_conversation(id).await {
        Ok(()) => {}
        Err(err) if err.kind == ApiErrorKind::HttpStatus => {
            tracing::warn!(id, "delete rejected, removing locally: {err}");
        }
        Err(err) => {
            tracing::warn!(id, kind = %err.kind, "failed to delete conversation: {err}");
            return false;
        }
    }

    state.items.retain(|item| item.id != id);
    if state.is_current(id) {
        state.current_id = None;
        reset_view(dispatch, sink);
    }
    true
}

fn reset_view<S>(dispatch: &mut DispatchState, sink: &mut S)
where
    S: RenderSink + ?Sized,
{
    reducer::abandon(dispatch);
    sink.clear();
    sink.show_idle_view();
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::message::Message;
    use crate::transcript::Transcript;

    fn summary(id: &str, title: Option<&str>) -> ConversationSummary {
        ConversationSummary {
            id: id.to_string(),
            title: title.map(str::to_string),
            created_at: None,
        }
    }

    async fn mount_list(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/chat/list/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_display_title() {
        assert_eq!(display_title(None), DEFAULT_TITLE);
        assert_eq!(display_title(Some("")), DEFAULT_TITLE);
        assert_eq!(display_title(Some("청년 월세 지원")), "청년 월세 지원");

        let exact = "가".repeat(20);
        assert_eq!(display_title(Some(&exact)), exact);

        let long = "나".repeat(21);
        assert_eq!(display_title(Some(&long)), format!("{}...", "나".repeat(20)));
    }

    #[test]
    fn test_entries_mark_current() {
        let state = ConversationState {
            current_id: Some("b".to_string()),
            items: vec![summary("a", Some("첫 대화")), summary("b", None)],
        };

        let entries = state.entries();
        assert!(!entries[0].active);
        assert!(entries[1].active);
        assert_eq!(entries[1].title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_load_list_falls_back_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/list/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let client = BackendClient::new(server.uri());
        let mut state = ConversationState {
            items: vec![summary("old", None)],
            ..Default::default()
        };

        load_list(&client, &mut state).await;

        assert!(state.items.is_empty());
    }

    #[tokio::test]
    async fn test_new_conversation_resets_view_even_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/new/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_list(&server, json!({"conversations": [{"id": "x", "title": "t"}]})).await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();
        sink.append(Message::user("hi"));
        sink.hide_idle_view();

        let id = new_conversation(&client, &mut state, &mut dispatch, &mut sink).await;

        assert_eq!(id, None);
        assert!(sink.is_empty());
        assert!(sink.shows_idle_view());
        assert_eq!(state.items.len(), 1);
    }

    #[tokio::test]
    async fn test_new_conversation_sets_current() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/new/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"conversation_id": "c9"})),
            )
            .mount(&server)
            .await;
        mount_list(&server, json!({"conversations": [{"id": "c9"}]})).await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();

        let id = new_conversation(&client, &mut state, &mut dispatch, &mut sink).await;

        assert_eq!(id.as_deref(), Some("c9"));
        assert!(state.entries()[0].active);
    }

    #[tokio::test]
    async fn test_open_replaces_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chat/c1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [
                    {"content": "주거 지원 알려줘", "role": "user"},
                    {"content": "청년 월세 지원이 있어요.", "role": "bot"}
                ]
            })))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();
        sink.append(Message::user("stale"));

        assert!(open(&client, &mut state, &mut dispatch, &mut sink, "c1").await);

        assert_eq!(state.current_id.as_deref(), Some("c1"));
        assert_eq!(
            sink.messages(),
            &[
                Message::user("주거 지원 알려줘"),
                Message::bot("청년 월세 지원이 있어요.")
            ]
        );
        assert!(!sink.shows_idle_view());
    }

    #[tokio::test]
    async fn test_open_failure_keeps_view() {
        let server = MockServer::start().await;
        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();
        sink.append(Message::user("keep me"));

        assert!(!open(&client, &mut state, &mut dispatch, &mut sink, "missing").await);

        assert_eq!(sink.messages(), &[Message::user("keep me")]);
        assert_eq!(state.current_id.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_rename_blank_is_skipped() {
        let server = MockServer::start().await;
        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();

        let outcome = rename(&client, &mut state, "c1", "   ").await;

        assert_eq!(outcome, RenameOutcome::Skipped);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_success_reloads_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/c1/rename/"))
            .and(body_string_contains("title="))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        mount_list(&server, json!({"conversations": [{"id": "c1", "title": "새 이름"}]})).await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState::new();

        let outcome = rename(&client, &mut state, "c1", " 새 이름 ").await;

        assert_eq!(outcome, RenameOutcome::Renamed);
        assert_eq!(state.items[0].title.as_deref(), Some("새 이름"));
    }

    #[tokio::test]
    async fn test_rename_rejected_updates_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/c1/rename/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState {
            items: vec![summary("c1", Some("old"))],
            ..Default::default()
        };

        let outcome = rename(&client, &mut state, "c1", "new").await;

        assert_eq!(outcome, RenameOutcome::RenamedLocally);
        assert_eq!(state.items[0].title.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_delete_current_resets_view() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/c1/delete/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let mut state = ConversationState {
            current_id: Some("c1".to_string()),
            items: vec![summary("c1", None), summary("c2", None)],
        };
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();
        sink.append(Message::bot("hello"));

        assert!(delete(&client, &mut state, &mut dispatch, &mut sink, "c1").await);

        assert_eq!(state.current_id, None);
        assert_eq!(state.items.len(), 1);
        assert!(sink.is_empty());
        assert!(sink.shows_idle_view());
    }

    #[tokio::test]
    async fn test_delete_transport_failure_keeps_entry() {
        // Nothing listens on port 9 of localhost.
        let client = BackendClient::new("http://127.0.0.1:9");
        let mut state = ConversationState {
            current_id: None,
            items: vec![summary("c1", None)],
        };
        let mut dispatch = DispatchState::new();
        let mut sink = Transcript::new();

        assert!(!delete(&client, &mut state, &mut dispatch, &mut sink, "c1").await);
        assert_eq!(state.items.len(), 1);
    }
}
