//! Domain logic for the onboarding-progress core.
//!
//! Pure types and rules shared by the data-access, CRM-integration,
//! and API crates:
//!
//! - [`error::CoreError`] — domain error taxonomy.
//! - [`status`] — onboarding milestone fields, sparse patches, and
//!   derived status computation.
//! - [`credentials`] — credential kinds, subject ids, and the token
//!   expiry rule.
//! - [`webhook`] — CRM webhook event classification.

pub mod credentials;
pub mod error;
pub mod status;
pub mod types;
pub mod webhook;

pub use error::CoreError;
