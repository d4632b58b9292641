//! Runtime execution modes.
//!
//! - `chat`: line-based interactive REPL (stdin/stdout)

pub mod chat;

pub use chat::run_chat;
