use std::future::{self, Future};

use super::ports::{ChatBackend, InputCollector, RenderSink};
use super::reducer::{self, Settlement, Submit};
use super::session::DispatchState;

/// Outcome of one [`MessageDispatcher::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Ignored,
    CancelRequested,
    Settled(Settlement),
}

/// Runs the whole send lifecycle against a [`ChatBackend`].
///
/// Holds `&mut self` across the request, so it suits one-shot callers. The
/// chat REPL keeps a bare [`DispatchState`] instead and settles tickets from
/// its event loop, which keeps the stop command live while a send runs.
pub struct MessageDispatcher<B> {
    backend: B,
    state: DispatchState,
}

impl<B: ChatBackend> MessageDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: DispatchState::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state.is_sending()
    }

    /// Sends `text` and waits for the answer.
    pub async fn submit<S, I>(&mut self, text: &str, sink: &mut S, input: &mut I) -> Dispatched
    where
        S: RenderSink + ?Sized,
        I: InputCollector + ?Sized,
    {
        self.submit_until(text, sink, input, future::pending()).await
    }

    /// Sends `text`; cancels the send if `stop` resolves first.
    pub async fn submit_until<S, I, F>(
        &mut self,
        text: &str,
        sink: &mut S,
        input: &mut I,
        stop: F,
    ) -> Dispatched
    where
        S: RenderSink + ?Sized,
        I: InputCollector + ?Sized,
        F: Future<Output = ()>,
    {
        let ticket = match reducer::submit(&mut self.state, text, sink, input) {
            Submit::Ignored => return Dispatched::Ignored,
            Submit::CancelRequested => return Dispatched::CancelRequested,
            Submit::Started(ticket) => ticket,
        };

        let result = {
            let request = self.backend.ask(&ticket.question, ticket.cancel.clone());
            tokio::pin!(request);
            tokio::pin!(stop);

            tokio::select! {
                biased;
                result = &mut request => result,
                () = &mut stop => {
                    reducer::cancel(&self.state);
                    request.await
                }
            }
        };

        Dispatched::Settled(reducer::complete(
            &mut self.state,
            ticket,
            result,
            sink,
            input,
        ))
    }

    /// Forgets any in-flight session.
    pub fn abandon(&mut self) -> bool {
        reducer::abandon(&mut self.state)
    }
}
