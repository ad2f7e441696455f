//! Tenant-ownership resolution with in-process memoization.
//!
//! Lookup order: in-process memo, durable `tenant_ownerships` record,
//! then the platform API tried with each known parent credential in
//! turn. Successful API lookups are written through to both layers.
//! Misses are never negatively cached — ownership can become knowable
//! later, once authorization completes.

use std::collections::HashMap;
use std::sync::Arc;

use hatch_core::credentials::CredentialKind;
use hatch_db::repositories::{CredentialRepo, OwnershipRepo};
use hatch_db::DbPool;
use tokio::sync::RwLock;

use crate::client::CrmClient;

/// Resolves "which parent account owns tenant X".
///
/// Constructed once per process and shared via `Arc`; the memo table
/// is interior-mutable behind an async `RwLock`.
pub struct OwnershipCache {
    pool: DbPool,
    client: Arc<CrmClient>,
    memo: RwLock<HashMap<String, String>>,
}

impl OwnershipCache {
    /// Create an empty cache over the given pool and platform client.
    pub fn new(pool: DbPool, client: Arc<CrmClient>) -> Self {
        Self {
            pool,
            client,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Return the owning parent account id for a tenant, if knowable.
    ///
    /// `None` is an expected state for unauthorized or foreign tenants,
    /// never an error.
    pub async fn owner_of(&self, tenant_id: &str) -> Option<String> {
        if let Some(parent) = self.memo.read().await.get(tenant_id) {
            return Some(parent.clone());
        }

        match OwnershipRepo::get(&self.pool, tenant_id).await {
            Ok(Some(record)) => {
                self.memo
                    .write()
                    .await
                    .insert(tenant_id.to_string(), record.parent_account_id.clone());
                return Some(record.parent_account_id);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Ownership record lookup failed");
                // Fall through to the API: the mapping may still be
                // resolvable even if the table read failed.
            }
        }

        self.resolve_via_api(tenant_id).await
    }

    /// Ask the platform who owns the tenant, trying each parent
    /// credential in turn. A parent credential only sees tenants it
    /// owns, so a not-authorized response means "try the next one".
    async fn resolve_via_api(&self, tenant_id: &str) -> Option<String> {
        let parents = match CredentialRepo::list_by_kind(&self.pool, CredentialKind::Parent).await {
            Ok(parents) => parents,
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Parent credential listing failed");
                return None;
            }
        };

        for cred in &parents {
            if cred.is_expired() {
                // Refresh belongs to the token resolver, not here. An
                // all-expired deployment leaves the owner unknown until
                // the resolver's fallback chain refreshes a parent
                // credential; tokens still resolve in the meantime.
                tracing::debug!(
                    subject_id = %cred.subject_id,
                    "Skipping expired parent credential for ownership lookup"
                );
                continue;
            }

            match self.client.get_location(tenant_id, &cred.access_token).await {
                Ok(location) => {
                    let Some(parent_id) = location.company_id else {
                        tracing::warn!(tenant_id, "Location response carried no parent account id");
                        continue;
                    };
                    self.write_through(tenant_id, &parent_id, location.name.as_deref())
                        .await;
                    return Some(parent_id);
                }
                Err(e) if e.is_not_authorized() => {
                    tracing::debug!(
                        tenant_id,
                        subject_id = %cred.subject_id,
                        "Parent credential cannot see tenant, trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        tenant_id,
                        subject_id = %cred.subject_id,
                        error = %e,
                        "Ownership lookup via platform API failed, trying next credential"
                    );
                }
            }
        }

        None
    }

    /// Persist a discovered mapping to the memo and the durable record.
    async fn write_through(&self, tenant_id: &str, parent_id: &str, display_name: Option<&str>) {
        self.memo
            .write()
            .await
            .insert(tenant_id.to_string(), parent_id.to_string());

        if let Err(e) = OwnershipRepo::upsert(&self.pool, tenant_id, parent_id, display_name).await
        {
            // The memo already has the mapping; the durable record just
            // saves future processes the API call.
            tracing::error!(tenant_id, error = %e, "Failed to persist tenant ownership");
        } else {
            tracing::info!(tenant_id, parent_id, "Resolved tenant ownership via platform API");
        }
    }

    /// Pre-populate the memo (install callbacks know the owner upfront).
    pub async fn remember(&self, tenant_id: &str, parent_id: &str) {
        self.memo
            .write()
            .await
            .insert(tenant_id.to_string(), parent_id.to_string());
    }
}
