//! Handlers for per-tenant onboarding status.

use axum::extract::{Path, Query, State};
use axum::Json;
use hatch_core::status::{StatusField, StatusPatch, StatusView};
use hatch_db::repositories::StatusRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `GET .../status`.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// If `true`, re-check milestones against the live platform before
    /// reading. Defaults to `false`.
    pub refresh: Option<bool>,
}

/// GET /api/v1/tenants/{tenant_id}/status
///
/// Derived status for the widget. With `?refresh=true` the handler
/// first re-checks the connected domain and product existence against
/// the platform; any platform failure falls back to the stored status.
pub async fn get_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Query(params): Query<StatusQuery>,
) -> AppResult<Json<StatusView>> {
    if params.refresh.unwrap_or(false) {
        refresh_from_platform(&state, &tenant_id).await;
    }

    let status = StatusRepo::get(&state.pool, &tenant_id).await?;
    Ok(Json(status.into_view()))
}

/// PATCH /api/v1/tenants/{tenant_id}/status
///
/// Sparse update: only fields present in the body are written. Unknown
/// fields are rejected by deserialization before any storage access.
pub async fn update_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(patch): Json<StatusPatch>,
) -> AppResult<Json<StatusView>> {
    let status = StatusRepo::patch(&state.pool, &tenant_id, &patch).await?;
    let view = status.into_view();

    if !patch.is_empty() {
        state.broker.broadcast(&tenant_id).await;
    }

    Ok(Json(view))
}

/// POST /api/v1/tenants/{tenant_id}/status/{field}/toggle
///
/// Atomically negate one named field. Invalid field names are rejected
/// at the boundary with a 400.
pub async fn toggle_status(
    State(state): State<AppState>,
    Path((tenant_id, field)): Path<(String, String)>,
) -> AppResult<Json<StatusView>> {
    let field = StatusField::parse(&field)?;

    let status = StatusRepo::toggle(&state.pool, &tenant_id, field).await?;
    let view = status.into_view();

    state.broker.broadcast(&tenant_id).await;

    Ok(Json(view))
}

/// GET /api/v1/tenants/{tenant_id}/install-status
///
/// Whether this tenant currently resolves to a usable credential, and
/// if not, what the viewer should do about it.
pub async fn install_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Json<hatch_crm::InstallStatus> {
    Json(state.tokens.install_status(&tenant_id).await)
}

/// Best-effort live re-check of the domain and course milestones.
///
/// No token, a timed-out call, or a platform error all degrade to the
/// last stored status — transient platform failures are never surfaced
/// to the viewer as hard errors.
async fn refresh_from_platform(state: &AppState, tenant_id: &str) {
    let Some(token) = state.tokens.resolve(tenant_id).await else {
        tracing::debug!(tenant_id, "No credential for live refresh, using stored status");
        return;
    };

    let current = match StatusRepo::get(&state.pool, tenant_id).await {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(tenant_id, error = %e, "Status read before live refresh failed");
            return;
        }
    };

    let mut patch = StatusPatch::default();

    match state.crm.get_location(tenant_id, &token.access_token).await {
        Ok(location) => {
            let connected = location
                .domain
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty());
            if current.domain_connected != connected {
                patch.domain_connected = Some(connected);
            }
        }
        Err(e) => {
            tracing::warn!(tenant_id, error = %e, "Live domain check failed, keeping stored value");
        }
    }

    // Monotonic: a product listing failure or an empty page never
    // clears a previously observed course.
    if !current.course_created {
        match state.crm.has_products(tenant_id, &token.access_token).await {
            Ok(true) => patch.course_created = Some(true),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "Live product check failed, keeping stored value");
            }
        }
    }

    if patch.is_empty() {
        return;
    }

    match StatusRepo::patch(&state.pool, tenant_id, &patch).await {
        Ok(_) => state.broker.broadcast(tenant_id).await,
        Err(e) => {
            tracing::error!(tenant_id, error = %e, "Failed to persist live-refreshed milestones");
        }
    }
}
