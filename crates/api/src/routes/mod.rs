pub mod health;
pub mod status;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /tenants/{tenant_id}/status                     get, patch
/// /tenants/{tenant_id}/status/{field}/toggle      toggle one field (POST)
/// /tenants/{tenant_id}/status/stream              SSE live updates
/// /tenants/{tenant_id}/install-status             credential check
/// /tenants/{tenant_id}/events                     recent audited webhook events
///
/// /webhooks/crm                                   platform event ingestion (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tenants/{tenant_id}", status::router())
        .nest("/webhooks", webhook::router())
}
