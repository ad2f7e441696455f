//! Row models for all tables.

pub mod credential;
pub mod ownership;
pub mod status;
pub mod webhook_event;
