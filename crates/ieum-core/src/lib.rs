//! Core ieum library (dispatch controller, backend client, config).

pub mod api;
pub mod config;
pub mod conversations;
pub mod dispatch;
pub mod interrupt;
pub mod logging;
pub mod message;
pub mod search;
pub mod transcript;
