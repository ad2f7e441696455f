//! Request handlers.

pub mod status;
pub mod stream;
pub mod webhook;
