//! CRM platform integration.
//!
//! Everything that talks to the external CRM platform lives here:
//!
//! - [`CrmClient`] — bounded-timeout HTTP client for the platform REST
//!   API and OAuth token endpoint.
//! - [`TokenResolver`] — picks a currently-valid bearer credential for
//!   an arbitrary tenant, refreshing transparently and serializing
//!   concurrent refreshes per credential subject.
//! - [`OwnershipCache`] — resolves which parent account owns a tenant,
//!   memoized in process and written through to the database.
//!
//! Absence of a token or an owner is a normal outcome here, never an
//! error: all helpers return `Option`/soft results and log internally.

pub mod client;
pub mod config;
pub mod ownership;
pub mod tokens;

pub use client::{CrmClient, CrmError};
pub use config::CrmConfig;
pub use ownership::OwnershipCache;
pub use tokens::{InstallStatus, ResolvedToken, TokenResolver};
