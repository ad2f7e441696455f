//! Per-tenant live status fanout.
//!
//! [`StatusBroker`] keeps a set of push subscribers per tenant. New
//! subscribers immediately receive one status snapshot so they are
//! never left blank until the next change. Subscribers whose channel
//! is closed are pruned on the next send attempt — broadcast or
//! keep-alive — so the broker never accumulates dead connections.
//! No reconnect state is held: a reconnecting viewer re-subscribes
//! from scratch and gets a fresh snapshot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hatch_core::status::StatusView;
use hatch_core::types::TenantId;
use hatch_db::repositories::StatusRepo;
use hatch_db::DbPool;
use tokio::sync::{mpsc, RwLock};

/// Interval between keep-alive pings (in seconds).
const KEEPALIVE_INTERVAL_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// StatusFrame
// ---------------------------------------------------------------------------

/// One frame pushed to a subscriber.
///
/// A `Message` frame is always a full status replacement, never a
/// delta. `Ping` frames only keep intermediary infrastructure from
/// dropping idle connections.
#[derive(Debug, Clone)]
pub enum StatusFrame {
    Message(StatusView),
    Ping { ts: i64 },
}

/// Channel sender half for pushing frames to one subscriber.
type FrameSender = mpsc::UnboundedSender<StatusFrame>;

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// A live subscription handle.
///
/// Dropping it (the viewer disconnected) removes the subscriber from
/// the broker's registry.
pub struct Subscription {
    broker: Arc<StatusBroker>,
    tenant_id: TenantId,
    subscriber_id: u64,
    pub receiver: mpsc::UnboundedReceiver<StatusFrame>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let broker = Arc::clone(&self.broker);
        let tenant_id = self.tenant_id.clone();
        let subscriber_id = self.subscriber_id;
        tokio::spawn(async move {
            broker.remove(&tenant_id, subscriber_id).await;
        });
    }
}

// ---------------------------------------------------------------------------
// StatusBroker
// ---------------------------------------------------------------------------

/// Maintains per-tenant sets of live subscriber channels.
///
/// Created once at application startup and shared via `Arc`.
pub struct StatusBroker {
    pool: DbPool,
    subscribers: RwLock<HashMap<TenantId, HashMap<u64, FrameSender>>>,
    next_id: AtomicU64,
}

impl StatusBroker {
    /// Create an empty broker over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new subscriber for a tenant.
    ///
    /// The current status snapshot (ensure-then-read) is queued on the
    /// returned channel before this call returns, so the subscriber is
    /// never blank. Fails only if the snapshot read fails; callers
    /// treat that as retryable.
    pub async fn subscribe(
        self: &Arc<Self>,
        tenant_id: &str,
    ) -> Result<Subscription, sqlx::Error> {
        // Snapshot and registration happen under the same write lock:
        // every update committed before the snapshot read is in the
        // snapshot, and any later broadcast queues its frame behind
        // the registration. No update can fall between the two.
        let mut subscribers = self.subscribers.write().await;
        let snapshot = StatusRepo::get(&self.pool, tenant_id).await?.into_view();

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(StatusFrame::Message(snapshot));

        let subscriber_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        subscribers
            .entry(tenant_id.to_string())
            .or_default()
            .insert(subscriber_id, tx);
        drop(subscribers);

        tracing::debug!(tenant_id, subscriber_id, "Status subscriber registered");

        Ok(Subscription {
            broker: Arc::clone(self),
            tenant_id: tenant_id.to_string(),
            subscriber_id,
            receiver: rx,
        })
    }

    /// Push the tenant's current status to every live subscriber.
    ///
    /// Subscribers whose channel send fails are treated as closed and
    /// pruned, never retried.
    pub async fn broadcast(&self, tenant_id: &str) {
        if self.subscriber_count(tenant_id).await == 0 {
            return;
        }

        let view = match StatusRepo::get(&self.pool, tenant_id).await {
            Ok(row) => row.into_view(),
            Err(e) => {
                tracing::error!(tenant_id, error = %e, "Status read for broadcast failed");
                return;
            }
        };

        let mut subscribers = self.subscribers.write().await;
        let Some(set) = subscribers.get_mut(tenant_id) else {
            return;
        };

        set.retain(|subscriber_id, tx| {
            let alive = tx.send(StatusFrame::Message(view.clone())).is_ok();
            if !alive {
                tracing::debug!(tenant_id, subscriber_id, "Pruned closed status subscriber");
            }
            alive
        });

        if set.is_empty() {
            subscribers.remove(tenant_id);
        }
    }

    /// Send a keep-alive ping to every subscriber of every tenant,
    /// pruning the ones whose channel is closed.
    pub async fn ping_all(&self) {
        let ts = chrono::Utc::now().timestamp_millis();
        let mut subscribers = self.subscribers.write().await;

        subscribers.retain(|tenant_id, set| {
            set.retain(|subscriber_id, tx| {
                let alive = tx.send(StatusFrame::Ping { ts }).is_ok();
                if !alive {
                    tracing::debug!(
                        tenant_id = %tenant_id,
                        subscriber_id,
                        "Pruned closed subscriber during keep-alive"
                    );
                }
                alive
            });
            !set.is_empty()
        });
    }

    /// Number of live subscribers for a tenant.
    pub async fn subscriber_count(&self, tenant_id: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(tenant_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Remove one subscriber, dropping the tenant's set if it empties.
    async fn remove(&self, tenant_id: &str, subscriber_id: u64) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(set) = subscribers.get_mut(tenant_id) {
            set.remove(&subscriber_id);
            if set.is_empty() {
                subscribers.remove(tenant_id);
            }
        }
    }
}

/// Spawn the periodic keep-alive task.
///
/// Runs for the life of the process; the returned handle can abort it.
pub fn start_keepalive(broker: Arc<StatusBroker>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(KEEPALIVE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            broker.ping_all().await;
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
