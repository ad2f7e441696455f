//! Route definitions for the per-tenant resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{status, stream, webhook};
use crate::state::AppState;

/// Routes mounted at `/tenants/{tenant_id}`.
///
/// ```text
/// GET    /status                  -> get_status
/// PATCH  /status                  -> update_status
/// POST   /status/{field}/toggle   -> toggle_status
/// GET    /status/stream           -> stream_status (SSE)
/// GET    /install-status          -> install_status
/// GET    /events                  -> recent_events (audit log)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::get_status).patch(status::update_status))
        .route("/status/{field}/toggle", post(status::toggle_status))
        .route("/status/stream", get(stream::stream_status))
        .route("/install-status", get(status::install_status))
        .route("/events", get(webhook::recent_events))
}
