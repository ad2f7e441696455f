//! Repository for the `tenant_ownerships` table.

use sqlx::PgPool;

use crate::models::ownership::TenantOwnership;

/// Column list for `tenant_ownerships` queries.
const OWNERSHIP_COLUMNS: &str =
    "tenant_id, parent_account_id, display_name, first_seen_at, last_seen_at, active";

/// Provides read/write operations for tenant→parent-account mappings.
pub struct OwnershipRepo;

impl OwnershipRepo {
    /// Look up the ownership record for a tenant.
    pub async fn get(
        pool: &PgPool,
        tenant_id: &str,
    ) -> Result<Option<TenantOwnership>, sqlx::Error> {
        let query = format!("SELECT {OWNERSHIP_COLUMNS} FROM tenant_ownerships WHERE tenant_id = $1");
        sqlx::query_as::<_, TenantOwnership>(&query)
            .bind(tenant_id)
            .fetch_optional(pool)
            .await
    }

    /// Record (or refresh) the owning parent account for a tenant.
    ///
    /// On conflict the parent and display name are updated and
    /// `last_seen_at` is bumped; `first_seen_at` is preserved.
    pub async fn upsert(
        pool: &PgPool,
        tenant_id: &str,
        parent_account_id: &str,
        display_name: Option<&str>,
    ) -> Result<TenantOwnership, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenant_ownerships (tenant_id, parent_account_id, display_name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (tenant_id) DO UPDATE SET \
                parent_account_id = EXCLUDED.parent_account_id, \
                display_name = COALESCE(EXCLUDED.display_name, tenant_ownerships.display_name), \
                last_seen_at = NOW(), \
                active = TRUE \
             RETURNING {OWNERSHIP_COLUMNS}"
        );
        sqlx::query_as::<_, TenantOwnership>(&query)
            .bind(tenant_id)
            .bind(parent_account_id)
            .bind(display_name)
            .fetch_one(pool)
            .await
    }
}
