use std::sync::Arc;

use hatch_crm::{CrmClient, TokenResolver};
use hatch_events::StatusBroker;

use crate::config::ServerConfig;
use crate::webhooks::WebhookRouter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// CRM platform HTTP client.
    pub crm: Arc<CrmClient>,
    /// Multi-tenant bearer token resolution.
    pub tokens: Arc<TokenResolver>,
    /// Live status fanout to connected viewers.
    pub broker: Arc<StatusBroker>,
    /// Inbound webhook processing.
    pub webhook_router: Arc<WebhookRouter>,
}
