//! OAuth credential entity model.

use hatch_core::credentials::{is_expired, CredentialKind};
use hatch_core::types::Timestamp;
use hatch_core::CoreError;
use sqlx::FromRow;

/// A row from the `credentials` table.
///
/// One row per subject: a tenant id, or `agency:{parent_id}` for a
/// parent-account credential. Mutated only by token refresh and the
/// OAuth install callback; deleted only on explicit tenant reset.
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub subject_id: String,
    pub parent_account_id: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<String>,
    pub kind: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Credential {
    /// Typed credential kind.
    pub fn kind(&self) -> Result<CredentialKind, CoreError> {
        CredentialKind::parse(&self.kind)
    }

    /// Whether this credential is expired (or inside the safety buffer).
    pub fn is_expired(&self) -> bool {
        is_expired(self.expires_at)
    }
}

/// Fields written back after a successful token refresh or install.
#[derive(Debug, Clone)]
pub struct UpsertCredential<'a> {
    pub subject_id: &'a str,
    pub parent_account_id: Option<&'a str>,
    pub access_token: &'a str,
    /// `None` preserves the stored refresh token (some providers do
    /// not issue a new one on refresh).
    pub refresh_token: Option<&'a str>,
    pub expires_at: Option<Timestamp>,
    pub scope: Option<&'a str>,
    pub kind: CredentialKind,
}
