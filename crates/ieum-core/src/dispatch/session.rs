use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

#[derive(Debug, Default)]
pub(crate) struct SessionSeq {
    next: u64,
}

impl SessionSeq {
    pub(crate) fn next_id(&mut self) -> SessionId {
        let id = SessionId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Bookkeeping for one in-flight chat request.
#[derive(Debug, Clone)]
pub struct SendSession {
    pub id: SessionId,
    pub cancel: CancellationToken,
    pub started_at: Instant,
}

impl SendSession {
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Send lifecycle state (mutated only by the dispatch reducer).
///
/// The sending flag is derived from the session, so "sending" and "has a
/// session" cannot disagree.
#[derive(Debug, Default)]
pub struct DispatchState {
    session: Option<SendSession>,
    seq: SessionSeq,
}

impl DispatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_sending(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_session(&self) -> Option<&SendSession> {
        self.session.as_ref()
    }

    /// Opens a new session with a fresh cancellation token.
    pub(crate) fn start(&mut self) -> &SendSession {
        let session = SendSession {
            id: self.seq.next_id(),
            cancel: CancellationToken::new(),
            started_at: Instant::now(),
        };
        self.session.insert(session)
    }

    /// Closes the session only if `id` is still the active one.
    pub(crate) fn finish_if_active(&mut self, id: SessionId) -> Option<SendSession> {
        if self.session.as_ref().is_some_and(|s| s.id == id) {
            self.session.take()
        } else {
            None
        }
    }

    pub(crate) fn take(&mut self) -> Option<SendSession> {
        self.session.take()
    }
}
