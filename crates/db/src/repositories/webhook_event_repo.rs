//! Repository for the `webhook_events` audit table.

use hatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::webhook_event::WebhookEvent;

/// Column list for `webhook_events` queries.
const WEBHOOK_EVENT_COLUMNS: &str = "id, tenant_id, event_type, payload, created_at";

/// Provides write/read operations for the webhook audit log.
pub struct WebhookEventRepo;

impl WebhookEventRepo {
    /// Record an inbound event, understood or not.
    pub async fn insert(
        pool: &PgPool,
        tenant_id: Option<&str>,
        event_type: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO webhook_events (tenant_id, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(tenant_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List the most recent audit records for a tenant, newest first.
    pub async fn list_for_tenant(
        pool: &PgPool,
        tenant_id: &str,
        limit: i64,
    ) -> Result<Vec<WebhookEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {WEBHOOK_EVENT_COLUMNS} FROM webhook_events \
             WHERE tenant_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(tenant_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
