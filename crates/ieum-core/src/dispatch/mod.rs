//! Message dispatch: the send / cancel lifecycle of one chat question.
//!
//! A send moves through [`reducer::submit`] (user message, placeholder, fresh
//! session) and [`reducer::complete`] (answer or notice, placeholder removed,
//! input refocused). At most one session exists at a time; submitting while
//! one is active requests cancellation instead.
//!
//! Each session carries an id. Completions for a session that is no longer
//! active (because the view was reset with [`reducer::abandon`]) are dropped.

mod driver;
mod ports;
pub mod reducer;
mod session;

pub use driver::{Dispatched, MessageDispatcher};
pub use ports::{ChatBackend, InputCollector, LineBuffer, PlaceholderHandle, RenderSink};
pub use reducer::{CANCELLED_NOTICE, FAILURE_NOTICE, SendTicket, Settlement, Submit};
pub use session::{DispatchState, SendSession, SessionId};
