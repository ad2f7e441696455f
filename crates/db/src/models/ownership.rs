//! Tenant-ownership mapping entity model.

use hatch_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tenant_ownerships` table.
///
/// Created lazily the first time a tenant's owning parent account is
/// discovered; the table is never required to be complete.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TenantOwnership {
    pub tenant_id: String,
    pub parent_account_id: String,
    pub display_name: Option<String>,
    pub first_seen_at: Timestamp,
    pub last_seen_at: Timestamp,
    pub active: bool,
}
