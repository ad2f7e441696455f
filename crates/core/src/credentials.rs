//! Credential kinds, subject ids, and the token expiry rule.

use chrono::{Duration, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Safety buffer subtracted from `expires_at` when deciding whether a
/// token is still usable. Covers clock skew and in-flight latency.
pub const EXPIRY_BUFFER_MINUTES: i64 = 5;

/// Prefix for synthetic subject ids of parent-account credentials.
const AGENCY_SUBJECT_PREFIX: &str = "agency:";

// ---------------------------------------------------------------------------
// CredentialKind
// ---------------------------------------------------------------------------

/// Discriminates tenant-scoped from parent-account (agency) credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Tenant,
    Parent,
}

impl CredentialKind {
    /// The database representation of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKind::Tenant => "tenant",
            CredentialKind::Parent => "parent",
        }
    }

    /// Parse the database representation back into the enum.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "tenant" => Ok(CredentialKind::Tenant),
            "parent" => Ok(CredentialKind::Parent),
            other => Err(CoreError::Internal(format!(
                "Unknown credential kind '{other}' in storage"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Subject ids
// ---------------------------------------------------------------------------

/// Synthetic subject id for a parent-account credential.
pub fn agency_subject_id(parent_account_id: &str) -> String {
    format!("{AGENCY_SUBJECT_PREFIX}{parent_account_id}")
}

/// Extract the parent account id from an `agency:{id}` subject id.
pub fn parent_id_from_subject(subject_id: &str) -> Option<&str> {
    subject_id.strip_prefix(AGENCY_SUBJECT_PREFIX)
}

// ---------------------------------------------------------------------------
// Expiry rule
// ---------------------------------------------------------------------------

/// Whether a credential should be treated as expired.
///
/// A credential with no `expires_at` never expires. Otherwise it is
/// expired once `now >= expires_at - EXPIRY_BUFFER_MINUTES`.
pub fn is_expired(expires_at: Option<Timestamp>) -> bool {
    match expires_at {
        None => false,
        Some(at) => Utc::now() >= at - Duration::minutes(EXPIRY_BUFFER_MINUTES),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn credential_without_expiry_never_expires() {
        assert!(!is_expired(None));
    }

    #[test]
    fn credential_expiring_far_in_future_is_valid() {
        assert!(!is_expired(Some(Utc::now() + Duration::hours(2))));
    }

    #[test]
    fn credential_inside_safety_buffer_is_expired() {
        // Expires in 3 minutes: inside the 5-minute buffer.
        assert!(is_expired(Some(Utc::now() + Duration::minutes(3))));
    }

    #[test]
    fn credential_in_the_past_is_expired() {
        assert!(is_expired(Some(Utc::now() - Duration::minutes(1))));
    }

    #[test]
    fn agency_subject_round_trip() {
        let subject = agency_subject_id("agency_123");
        assert_eq!(subject, "agency:agency_123");
        assert_eq!(parent_id_from_subject(&subject), Some("agency_123"));
        assert_eq!(parent_id_from_subject("loc_1"), None);
    }

    #[test]
    fn kind_parse_round_trip() {
        assert_eq!(
            CredentialKind::parse("tenant").unwrap(),
            CredentialKind::Tenant
        );
        assert_eq!(
            CredentialKind::parse("parent").unwrap(),
            CredentialKind::Parent
        );
        assert!(CredentialKind::parse("agency").is_err());
    }
}
