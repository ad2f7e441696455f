//! Multi-tenant bearer token resolution and refresh.
//!
//! [`TokenResolver::resolve`] walks a fixed fallback chain: the
//! tenant's own credential, then the owning parent account's, then any
//! parent credential at all. Expired credentials are refreshed against
//! the platform token endpoint; refreshes for the same subject are
//! serialized through a per-subject mutex so concurrent resolvers
//! await one in-flight exchange instead of burning refresh tokens.
//!
//! No token anywhere in the chain is a normal outcome ("this tenant is
//! not currently authorized"), not a resolver fault: every internal
//! failure is logged and converted into `None`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hatch_core::credentials::{agency_subject_id, parent_id_from_subject, CredentialKind};
use hatch_db::models::credential::{Credential, UpsertCredential};
use hatch_db::repositories::CredentialRepo;
use hatch_db::DbPool;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::client::CrmClient;
use crate::config::CrmConfig;
use crate::ownership::OwnershipCache;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A currently-valid bearer token, with the credential it came from.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub access_token: String,
    pub subject_id: String,
    pub kind: CredentialKind,
}

/// Result of the installation check exposed to the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallStatus {
    pub authorized: bool,
    /// `"tenant"` or `"parent"` when authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<&'static str>,
    /// Actionable remediation message when not authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// TokenResolver
// ---------------------------------------------------------------------------

/// Resolves a valid access token for an arbitrary tenant id.
pub struct TokenResolver {
    pool: DbPool,
    client: Arc<CrmClient>,
    config: CrmConfig,
    ownership: Arc<OwnershipCache>,
    /// Per-subject refresh serialization. The outer mutex only guards
    /// the map itself; refreshes hold the inner per-subject mutex.
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenResolver {
    /// Create a resolver over the given pool, client, and ownership cache.
    pub fn new(
        pool: DbPool,
        client: Arc<CrmClient>,
        config: CrmConfig,
        ownership: Arc<OwnershipCache>,
    ) -> Self {
        Self {
            pool,
            client,
            config,
            ownership,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Return a currently-valid access token for the tenant, if any.
    ///
    /// Chain, short-circuiting on first success:
    /// 1. the tenant's own credential (refreshing if expired);
    /// 2. the owning parent account's credential;
    /// 3. any parent credential at all (single-parent deployments).
    pub async fn resolve(&self, tenant_id: &str) -> Option<ResolvedToken> {
        // Step 1/2: tenant-scoped credential, valid or refreshable.
        // A failed refresh falls through — a stale tenant credential
        // must not mask a still-working parent credential.
        if let Some(cred) = self.load_credential(tenant_id).await {
            if let Some(token) = self.validate_or_refresh(cred).await {
                return Some(token);
            }
        }

        // Step 3: the owning parent account's credential.
        if let Some(parent_id) = self.ownership.owner_of(tenant_id).await {
            let subject = agency_subject_id(&parent_id);
            if let Some(cred) = self.load_credential(&subject).await {
                if let Some(token) = self.validate_or_refresh(cred).await {
                    return Some(token);
                }
            }
        }

        // Step 4: any parent credential (no ownership metadata needed).
        match CredentialRepo::find_first_by_kind(&self.pool, CredentialKind::Parent).await {
            Ok(Some(cred)) => {
                if let Some(token) = self.validate_or_refresh(cred).await {
                    return Some(token);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Fallback parent credential lookup failed");
            }
        }

        tracing::debug!(tenant_id, "No valid credential anywhere in the chain");
        None
    }

    /// Installation check for the widget boundary.
    ///
    /// Distinguishes "never authorized" from "authorization expired and
    /// could not be refreshed" — the remediation differs.
    pub async fn install_status(&self, tenant_id: &str) -> InstallStatus {
        if let Some(token) = self.resolve(tenant_id).await {
            return InstallStatus {
                authorized: true,
                token_type: Some(token.kind.as_str()),
                error_message: None,
            };
        }

        let had_credential = self.load_credential(tenant_id).await.is_some()
            || matches!(
                CredentialRepo::find_first_by_kind(&self.pool, CredentialKind::Parent).await,
                Ok(Some(_))
            );

        let message = if had_credential {
            "Your authorization has expired and could not be renewed. Please reauthorize the app."
        } else {
            "This location is not authorized. Ask your administrator to authorize the app."
        };

        InstallStatus {
            authorized: false,
            token_type: None,
            error_message: Some(message.to_string()),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Load a credential by subject, converting storage errors to `None`.
    async fn load_credential(&self, subject_id: &str) -> Option<Credential> {
        match CredentialRepo::get_by_subject(&self.pool, subject_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(subject_id, error = %e, "Credential lookup failed");
                None
            }
        }
    }

    /// Return the credential's token if still valid, otherwise try to
    /// refresh it. `None` means this credential is unusable.
    async fn validate_or_refresh(&self, cred: Credential) -> Option<ResolvedToken> {
        let kind = match cred.kind() {
            Ok(kind) => kind,
            Err(e) => {
                tracing::error!(subject_id = %cred.subject_id, error = %e, "Corrupt credential row");
                return None;
            }
        };

        if !cred.is_expired() {
            return Some(ResolvedToken {
                access_token: cred.access_token,
                subject_id: cred.subject_id,
                kind,
            });
        }

        self.refresh(cred, kind).await
    }

    /// Refresh an expired credential, serialized per subject.
    async fn refresh(&self, cred: Credential, kind: CredentialKind) -> Option<ResolvedToken> {
        let subject_id = cred.subject_id.clone();
        let lock = self.subject_lock(&subject_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock: a concurrent resolver may have
        // already refreshed this subject while we waited.
        let cred = match self.load_credential(&subject_id).await {
            Some(fresh) if !fresh.is_expired() => {
                tracing::debug!(subject_id, "Credential already refreshed by a concurrent caller");
                return Some(ResolvedToken {
                    access_token: fresh.access_token,
                    subject_id: fresh.subject_id,
                    kind,
                });
            }
            Some(fresh) => fresh,
            None => cred,
        };

        let Some(refresh_token) = cred.refresh_token.as_deref() else {
            tracing::warn!(subject_id, "Credential has no refresh token, cannot refresh");
            return None;
        };
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id.as_deref(), self.config.client_secret.as_deref())
        else {
            tracing::warn!(subject_id, "OAuth client credentials not configured, cannot refresh");
            return None;
        };

        let response = match self
            .client
            .refresh_token(refresh_token, client_id, client_secret)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(subject_id, error = %e, "Token refresh failed");
                return None;
            }
        };

        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        let upsert = UpsertCredential {
            subject_id: &subject_id,
            // Parent subject ids encode the account id; backfill it
            // when the stored row lacks one.
            parent_account_id: cred
                .parent_account_id
                .as_deref()
                .or_else(|| parent_id_from_subject(&subject_id)),
            access_token: &response.access_token,
            // None preserves the stored refresh token.
            refresh_token: response.refresh_token.as_deref(),
            expires_at,
            scope: response.scope.as_deref(),
            kind,
        };

        match CredentialRepo::upsert(&self.pool, &upsert).await {
            Ok(saved) => {
                tracing::info!(subject_id, "Refreshed access token");
                Some(ResolvedToken {
                    access_token: saved.access_token,
                    subject_id: saved.subject_id,
                    kind,
                })
            }
            Err(e) => {
                tracing::error!(subject_id, error = %e, "Failed to persist refreshed token");
                None
            }
        }
    }

    /// Fetch (or create) the per-subject refresh mutex.
    async fn subject_lock(&self, subject_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(
            locks
                .entry(subject_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subject_locks_are_shared_per_subject() {
        let config = CrmConfig {
            api_base_url: "http://localhost:1".into(),
            client_id: None,
            client_secret: None,
        };
        let client = Arc::new(CrmClient::new(&config));
        let pool = DbPool::connect_lazy("postgres://localhost/unused").unwrap();
        let ownership = Arc::new(OwnershipCache::new(pool.clone(), Arc::clone(&client)));
        let resolver = TokenResolver::new(pool, client, config, ownership);

        let a1 = resolver.subject_lock("agency:a").await;
        let a2 = resolver.subject_lock("agency:a").await;
        let b = resolver.subject_lock("agency:b").await;

        assert!(Arc::ptr_eq(&a1, &a2), "same subject must share one lock");
        assert!(!Arc::ptr_eq(&a1, &b), "different subjects must not");
    }
}
