//! Live status streaming over Server-Sent Events.
//!
//! Wire contract: each status update is an `event: message` frame whose
//! `data` is the full derived status JSON (a replacement, not a delta);
//! `event: ping` frames with `{"ts": <epoch-ms>}` keep intermediary
//! infrastructure from dropping idle connections. Keep-alive and
//! pruning are driven by the broker; dropping the stream (client
//! disconnect) unregisters the subscriber.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use hatch_events::{StatusFrame, Subscription};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/tenants/{tenant_id}/status/stream
///
/// Subscribe to live status updates. One snapshot frame is delivered
/// immediately; reconnection is entirely the client's responsibility
/// (re-subscribe from scratch, get a fresh snapshot).
pub async fn stream_status(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let subscription = state.broker.subscribe(&tenant_id).await?;

    // The subscription rides along as stream state so its Drop (which
    // unregisters the subscriber) runs when the client disconnects.
    let stream = futures::stream::unfold(subscription, |mut sub: Subscription| async move {
        let frame = sub.receiver.recv().await?;
        Some((Ok(frame_to_event(frame)), sub))
    });

    Ok(Sse::new(stream))
}

/// Render a broker frame as an SSE event.
fn frame_to_event(frame: StatusFrame) -> Event {
    match frame {
        StatusFrame::Message(view) => Event::default()
            .event("message")
            .data(serde_json::to_string(&view).unwrap_or_else(|_| "{}".into())),
        StatusFrame::Ping { ts } => Event::default()
            .event("ping")
            .data(format!("{{\"ts\":{ts}}}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatch_core::status::StatusView;

    #[test]
    fn ping_frame_renders_epoch_millis() {
        let event = frame_to_event(StatusFrame::Ping { ts: 1724572800000 });
        let rendered = format!("{event:?}");
        assert!(rendered.contains("ping"));
        assert!(rendered.contains("{\"ts\":1724572800000}"));
    }

    #[test]
    fn message_frame_carries_full_status_json() {
        let now = chrono::Utc::now();
        let view = StatusView::derive("loc_1".into(), true, false, false, false, now, now);
        let event = frame_to_event(StatusFrame::Message(view));
        let rendered = format!("{event:?}");
        assert!(rendered.contains("message"));
        assert!(rendered.contains("\"domainConnected\":true"));
        assert!(rendered.contains("\"shouldShowWidget\":true"));
    }
}
