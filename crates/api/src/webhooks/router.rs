//! Webhook event router.
//!
//! Classifies inbound platform events, applies idempotent status
//! transitions, and fans changes out to live viewers. [`WebhookRouter
//! ::handle`] never fails: platform webhooks must be acknowledged even
//! when processing breaks locally, or the platform retries forever on
//! a local bug.

use std::sync::Arc;

use hatch_core::status::{StatusField, StatusPatch};
use hatch_core::webhook::{classify, RouteAction};
use hatch_db::repositories::{StatusRepo, WebhookEventRepo};
use hatch_db::DbPool;
use hatch_events::{AnalyticsClient, StatusBroker};

/// Routes inbound CRM webhook events to status updates.
///
/// Created once at application startup and shared via `Arc`.
pub struct WebhookRouter {
    pool: DbPool,
    broker: Arc<StatusBroker>,
    analytics: Arc<AnalyticsClient>,
}

impl WebhookRouter {
    /// Create a router over the given pool, broker, and analytics client.
    pub fn new(pool: DbPool, broker: Arc<StatusBroker>, analytics: Arc<AnalyticsClient>) -> Self {
        Self {
            pool,
            broker,
            analytics,
        }
    }

    /// Process one raw webhook payload.
    ///
    /// All internal errors are caught and logged; the caller always
    /// acknowledges receipt to the platform.
    pub async fn handle(&self, payload: serde_json::Value) {
        let event = classify(&payload);

        // Audit every event, understood or not. Unmatched shapes are
        // debugged after the fact from this table.
        if let Err(e) = WebhookEventRepo::insert(
            &self.pool,
            event.tenant_id.as_deref(),
            event.event_type.as_deref(),
            &payload,
        )
        .await
        {
            tracing::error!(error = %e, "Failed to audit webhook event");
        }

        let Some(event_type) = event.event_type.as_deref() else {
            tracing::info!("Webhook event carried no type, dropping");
            return;
        };
        let Some(tenant_id) = event.tenant_id.as_deref() else {
            // Unroutable, not an error.
            tracing::info!(event_type, "Webhook event carried no tenant id, dropping");
            return;
        };

        if event.actions.is_empty() {
            tracing::debug!(event_type, tenant_id, "Webhook event matched no rule");
            return;
        }

        if let Err(e) = self.apply(tenant_id, event_type, &event.actions).await {
            tracing::error!(
                event_type,
                tenant_id,
                error = %e,
                "Failed to apply webhook status transition"
            );
        }
    }

    /// Apply matched actions to the tenant's status.
    ///
    /// The current status is read first so transitions stay idempotent:
    /// only fields that actually change are written, and only an actual
    /// change triggers a broadcast and an analytics event.
    async fn apply(
        &self,
        tenant_id: &str,
        event_type: &str,
        actions: &[RouteAction],
    ) -> Result<(), sqlx::Error> {
        let current = StatusRepo::get(&self.pool, tenant_id).await?;

        let mut patch = StatusPatch::default();
        let mut changed_fields: Vec<StatusField> = Vec::new();

        for action in actions {
            match action {
                RouteAction::SetDomainConnected(connected) => {
                    // Not monotonic: a removed domain is honored.
                    if current.domain_connected != *connected {
                        patch.domain_connected = Some(*connected);
                        changed_fields.push(StatusField::DomainConnected);
                    }
                }
                RouteAction::MarkCourseCreated => {
                    // Monotonic: deletion events are indistinguishable
                    // from creations here, so the flag never turns off.
                    if !current.course_created {
                        patch.course_created = Some(true);
                        changed_fields.push(StatusField::CourseCreated);
                    }
                }
                RouteAction::LocationTouched => {
                    // Too coarse to imply anything about the milestones.
                }
            }
        }

        if changed_fields.is_empty() {
            tracing::debug!(event_type, tenant_id, "Webhook event changed nothing");
            return Ok(());
        }

        StatusRepo::patch(&self.pool, tenant_id, &patch).await?;
        tracing::info!(
            event_type,
            tenant_id,
            fields = ?changed_fields.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "Webhook event updated onboarding status"
        );

        self.broker.broadcast(tenant_id).await;

        for field in &changed_fields {
            self.analytics.track(
                tenant_id,
                &format!("onboarding_{}", field.column()),
                serde_json::json!({ "eventType": event_type }),
            );
        }

        Ok(())
    }
}
