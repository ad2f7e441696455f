//! Webhook audit entity model.

use hatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `webhook_events` audit table.
///
/// Every inbound event is recorded — understood or not — so unmatched
/// event shapes can be debugged after the fact.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WebhookEvent {
    pub id: DbId,
    pub tenant_id: Option<String>,
    pub event_type: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
