//! Route definitions for webhook ingestion.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST   /crm   -> ingest
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/crm", post(webhook::ingest))
}
