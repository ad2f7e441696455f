//! HTTP boundary for the onboarding-progress core.
//!
//! Thin axum layer over the `hatch-*` crates: status read/update/
//! toggle, SSE live-status streaming, webhook ingestion, and the
//! installation check.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
pub mod webhooks;
