//! Live status fanout and fire-and-forget side effects.
//!
//! - [`StatusBroker`] — per-tenant registry of live push subscribers:
//!   snapshot on subscribe, broadcast on change, keep-alive pruning.
//! - [`AnalyticsClient`] — best-effort event tracking that never
//!   affects the caller's control flow.

pub mod analytics;
pub mod broker;

pub use analytics::AnalyticsClient;
pub use broker::{start_keepalive, StatusBroker, StatusFrame, Subscription};
