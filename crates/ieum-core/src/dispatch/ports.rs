//! Collaborator contracts for the dispatch controller.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::api::{ApiResult, AskResponse, BackendClient};
use crate::message::Message;

/// Identifies a loading placeholder shown by a [`RenderSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderHandle(pub u64);

/// Append-only message log the controller renders into.
pub trait RenderSink {
    fn append(&mut self, message: Message);

    fn clear(&mut self);

    fn show_loading_placeholder(&mut self) -> PlaceholderHandle;

    /// Removing an unknown or already removed handle is a no-op.
    fn remove_loading_placeholder(&mut self, handle: PlaceholderHandle);

    /// Hides the idle view shown before the first message.
    fn hide_idle_view(&mut self) {}

    /// Shows the idle view again (after a conversation reset).
    fn show_idle_view(&mut self) {}
}

/// Text input the user types questions into.
pub trait InputCollector {
    fn value(&self) -> String;

    fn clear(&mut self);

    fn focus(&mut self);
}

/// Network side of a send.
///
/// Implementations must resolve to a `Cancelled` error once `cancel` fires.
pub trait ChatBackend {
    fn ask(
        &self,
        question: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = ApiResult<AskResponse>> + Send;
}

impl ChatBackend for BackendClient {
    fn ask(
        &self,
        question: &str,
        cancel: CancellationToken,
    ) -> impl Future<Output = ApiResult<AskResponse>> + Send {
        BackendClient::ask(self, question, cancel)
    }
}

/// Single-line input buffer.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    value: String,
    focused: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.value = text.into();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

impl InputCollector for LineBuffer {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn clear(&mut self) {
        self.value.clear();
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
