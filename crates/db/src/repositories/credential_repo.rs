//! Repository for the `credentials` table.

use hatch_core::credentials::CredentialKind;
use sqlx::PgPool;

use crate::models::credential::{Credential, UpsertCredential};

/// Column list for `credentials` queries.
const CREDENTIAL_COLUMNS: &str = "subject_id, parent_account_id, access_token, refresh_token, \
     expires_at, scope, kind, created_at, updated_at";

/// Provides read/write operations for OAuth credentials.
pub struct CredentialRepo;

impl CredentialRepo {
    /// Find a credential by its subject id.
    pub async fn get_by_subject(
        pool: &PgPool,
        subject_id: &str,
    ) -> Result<Option<Credential>, sqlx::Error> {
        let query = format!("SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE subject_id = $1");
        sqlx::query_as::<_, Credential>(&query)
            .bind(subject_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update a credential, keyed by subject id.
    ///
    /// A `None` refresh token preserves whatever is already stored, so
    /// a refresh response without a new refresh token does not clobber
    /// the old (still valid) one.
    pub async fn upsert(
        pool: &PgPool,
        cred: &UpsertCredential<'_>,
    ) -> Result<Credential, sqlx::Error> {
        let query = format!(
            "INSERT INTO credentials \
                (subject_id, parent_account_id, access_token, refresh_token, expires_at, scope, kind) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (subject_id) DO UPDATE SET \
                parent_account_id = COALESCE(EXCLUDED.parent_account_id, credentials.parent_account_id), \
                access_token = EXCLUDED.access_token, \
                refresh_token = COALESCE(EXCLUDED.refresh_token, credentials.refresh_token), \
                expires_at = EXCLUDED.expires_at, \
                scope = COALESCE(EXCLUDED.scope, credentials.scope), \
                kind = EXCLUDED.kind, \
                updated_at = NOW() \
             RETURNING {CREDENTIAL_COLUMNS}"
        );
        sqlx::query_as::<_, Credential>(&query)
            .bind(cred.subject_id)
            .bind(cred.parent_account_id)
            .bind(cred.access_token)
            .bind(cred.refresh_token)
            .bind(cred.expires_at)
            .bind(cred.scope)
            .bind(cred.kind.as_str())
            .fetch_one(pool)
            .await
    }

    /// Delete a credential by subject id (explicit tenant reset only).
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_subject(pool: &PgPool, subject_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM credentials WHERE subject_id = $1")
            .bind(subject_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find any one credential of the given kind, oldest first.
    ///
    /// Supports the single-parent-account degenerate deployment where
    /// no ownership metadata is needed to pick the right credential.
    pub async fn find_first_by_kind(
        pool: &PgPool,
        kind: CredentialKind,
    ) -> Result<Option<Credential>, sqlx::Error> {
        let query = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE kind = $1 \
             ORDER BY created_at ASC LIMIT 1"
        );
        sqlx::query_as::<_, Credential>(&query)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// List all credentials of the given kind, oldest first.
    pub async fn list_by_kind(
        pool: &PgPool,
        kind: CredentialKind,
    ) -> Result<Vec<Credential>, sqlx::Error> {
        let query = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM credentials WHERE kind = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Credential>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }
}
