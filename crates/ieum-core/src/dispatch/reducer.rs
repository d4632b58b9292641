//! Send lifecycle transitions.
//!
//! Every function here is synchronous. The network call happens between
//! [`submit`] and [`complete`], driven by whoever holds the [`SendTicket`].

use tokio_util::sync::CancellationToken;

use super::ports::{InputCollector, PlaceholderHandle, RenderSink};
use super::session::{DispatchState, SessionId};
use crate::api::{ApiError, ApiResult, AskResponse};
use crate::message::Message;

/// Bot message shown when the user stops a pending answer.
pub const CANCELLED_NOTICE: &str = "응답 생성이 중지되었습니다.";

/// Bot message shown for any failure other than cancellation.
pub const FAILURE_NOTICE: &str = "죄송합니다. 오류가 발생했습니다. 다시 시도해주세요.";

/// Everything the driver needs to perform and settle one send.
#[derive(Debug)]
pub struct SendTicket {
    pub session: SessionId,
    pub question: String,
    pub cancel: CancellationToken,
    pub placeholder: PlaceholderHandle,
}

#[derive(Debug)]
pub enum Submit {
    /// Input was empty after trimming.
    Ignored,
    /// A send was already in flight; it has been asked to stop.
    CancelRequested,
    Started(SendTicket),
}

/// How a send ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Answered,
    Cancelled,
    Failed,
    /// The session was no longer active; nothing was rendered.
    Stale,
}

/// Begins a send for `text`.
///
/// While a send is in flight this acts as the stop button.
pub fn submit<S, I>(state: &mut DispatchState, text: &str, sink: &mut S, input: &mut I) -> Submit
where
    S: RenderSink + ?Sized,
    I: InputCollector + ?Sized,
{
    let question = text.trim();
    if question.is_empty() {
        return Submit::Ignored;
    }
    if state.is_sending() {
        cancel(state);
        return Submit::CancelRequested;
    }

    sink.hide_idle_view();
    sink.append(Message::user(question));
    input.clear();

    let session = state.start();
    let (id, token) = (session.id, session.cancel.clone());
    let placeholder = sink.show_loading_placeholder();
    tracing::debug!(session = id.0, chars = question.chars().count(), "send started");

    Submit::Started(SendTicket {
        session: id,
        question: question.to_string(),
        cancel: token,
        placeholder,
    })
}

/// Send button / Enter key: stops the pending answer, or sends the input.
pub fn dispatch<S, I>(state: &mut DispatchState, sink: &mut S, input: &mut I) -> Submit
where
    S: RenderSink + ?Sized,
    I: InputCollector + ?Sized,
{
    if state.is_sending() {
        cancel(state);
        return Submit::CancelRequested;
    }
    let text = input.value();
    submit(state, &text, sink, input)
}

/// Signals the active session's token. Returns `false` when idle.
///
/// The session stays open; [`complete`] closes it once the request settles.
pub fn cancel(state: &DispatchState) -> bool {
    let Some(session) = state.active_session() else {
        return false;
    };
    session.cancel.cancel();
    tracing::info!(
        session = session.id.0,
        elapsed_ms = session.elapsed().as_millis() as u64,
        "send cancellation requested"
    );
    true
}

/// Cancels and forgets the active session (conversation switch or reset).
///
/// The abandoned request's completion will be reported as stale.
pub fn abandon(state: &mut DispatchState) -> bool {
    let Some(session) = state.take() else {
        return false;
    };
    session.cancel.cancel();
    tracing::debug!(session = session.id.0, "send abandoned");
    true
}

/// Settles a send started by [`submit`].
///
/// A response that arrives after cancellation was requested is discarded in
/// favor of the cancellation notice.
pub fn complete<S, I>(
    state: &mut DispatchState,
    ticket: SendTicket,
    result: ApiResult<AskResponse>,
    sink: &mut S,
    input: &mut I,
) -> Settlement
where
    S: RenderSink + ?Sized,
    I: InputCollector + ?Sized,
{
    let Some(session) = state.finish_if_active(ticket.session) else {
        tracing::debug!(session = ticket.session.0, "ignoring stale completion");
        return Settlement::Stale;
    };

    sink.remove_loading_placeholder(ticket.placeholder);

    let result = if session.cancel.is_cancelled() {
        Err(ApiError::cancelled())
    } else {
        result
    };

    let settlement = match result {
        Ok(response) => {
            sink.append(Message::bot(response.answer));
            Settlement::Answered
        }
        Err(err) if err.is_cancelled() => {
            tracing::info!(session = session.id.0, "send cancelled");
            sink.append(Message::bot(CANCELLED_NOTICE));
            Settlement::Cancelled
        }
        Err(err) => {
            tracing::warn!(
                session = session.id.0,
                kind = %err.kind,
                details = err.details.as_deref().unwrap_or(""),
                "send failed: {err}"
            );
            sink.append(Message::bot(FAILURE_NOTICE));
            Settlement::Failed
        }
    };

    input.focus();
    settlement
}
