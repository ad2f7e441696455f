//! Fire-and-forget analytics tracking.
//!
//! Tracking is a side effect of status changes, never part of the
//! caller's control flow: [`AnalyticsClient::track`] spawns a task and
//! returns immediately, and delivery failures are only logged.

use std::sync::Arc;
use std::time::Duration;

/// HTTP request timeout for a single tracking call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort client for the external tracking collaborator.
///
/// With no endpoint configured, events are logged at debug level and
/// otherwise dropped — useful for local development and tests.
pub struct AnalyticsClient {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl AnalyticsClient {
    /// Create a client posting to the given endpoint (if any).
    pub fn new(endpoint: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, endpoint }
    }

    /// Load the endpoint from the `ANALYTICS_ENDPOINT` env var.
    pub fn from_env() -> Self {
        Self::new(std::env::var("ANALYTICS_ENDPOINT").ok().filter(|s| !s.is_empty()))
    }

    /// Track an event without awaiting or surfacing the outcome.
    pub fn track(
        self: &Arc<Self>,
        subject_id: &str,
        event_name: &str,
        properties: serde_json::Value,
    ) {
        let Some(endpoint) = self.endpoint.clone() else {
            tracing::debug!(subject_id, event_name, "Analytics disabled, dropping event");
            return;
        };

        let client = self.client.clone();
        let payload = serde_json::json!({
            "subjectId": subject_id,
            "event": event_name,
            "properties": properties,
            "timestamp": chrono::Utc::now(),
        });
        let subject_id = subject_id.to_string();
        let event_name = event_name.to_string();

        tokio::spawn(async move {
            match client.post(&endpoint).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    tracing::warn!(
                        subject_id,
                        event_name,
                        status = response.status().as_u16(),
                        "Analytics endpoint rejected event"
                    );
                }
                Err(e) => {
                    tracing::warn!(subject_id, event_name, error = %e, "Analytics delivery failed");
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
