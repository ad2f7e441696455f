//! Webhook ingestion and audit inspection handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use hatch_db::models::webhook_event::WebhookEvent;
use hatch_db::repositories::WebhookEventRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/webhooks/crm
///
/// Ingest one raw platform event. Always acknowledges with 200 once
/// the body parses as JSON — processing failures are logged inside the
/// router, never bounced back to the platform (which would retry
/// indefinitely on a local bug). Non-JSON bodies get the extractor's
/// 400, the only rejection the platform ever sees.
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.webhook_router.handle(payload).await;
    Json(json!({ "received": true }))
}

/// Query parameters for `GET .../events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Maximum number of records to return (default 20, capped at 100).
    pub limit: Option<i64>,
}

/// GET /api/v1/tenants/{tenant_id}/events
///
/// Recent audited webhook events for a tenant, newest first. The audit
/// table records every inbound event, so this is where event shapes
/// that matched no rule get debugged.
pub async fn recent_events(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(params): Query<EventsQuery>,
) -> AppResult<Json<Vec<WebhookEvent>>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let events = WebhookEventRepo::list_for_tenant(&state.pool, &tenant_id, limit).await?;
    Ok(Json(events))
}
