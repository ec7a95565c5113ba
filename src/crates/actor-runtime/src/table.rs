//! Per-actor inbox envelopes and the `messageId -> RequestEntry` bookkeeping
//! (SPEC_FULL §4.4). Grounded on `orchestrator::api::ws::pool`'s
//! bounded-queue-per-connection shape, narrowed to one inbox per actor and
//! one in-flight-request table per actor rather than per connection.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::handle::{ActorResponse, ProgressUpdate};

/// One queued method call, as it sits in an actor's inbox.
pub(crate) struct Envelope {
    pub message_id: String,
    pub method: String,
    pub params: Value,
}

struct InFlightRequest {
    completion: oneshot::Sender<ActorResponse>,
    progress: mpsc::UnboundedSender<ProgressUpdate>,
    sequence: AtomicU64,
}

/// Tracks in-flight requests for one actor and remembers which message ids
/// have already completed, so a late duplicate `complete` or
/// `on_progress_update` call after eviction is a silent no-op rather than a
/// panic.
pub(crate) struct RequestTable {
    in_flight: DashMap<String, InFlightRequest>,
    completed: Mutex<LruCache<String, ()>>,
}

impl RequestTable {
    pub(crate) fn new(retention_cap: usize) -> Self {
        let cap = NonZeroUsize::new(retention_cap.max(1)).expect("retention_cap clamped to >= 1");
        Self { in_flight: DashMap::new(), completed: Mutex::new(LruCache::new(cap)) }
    }

    pub(crate) fn register(&self, message_id: String, completion: oneshot::Sender<ActorResponse>, progress: mpsc::UnboundedSender<ProgressUpdate>) {
        self.in_flight.insert(message_id, InFlightRequest { completion, progress, sequence: AtomicU64::new(0) });
    }

    /// Push one progress update for `message_id`. Silently dropped if the
    /// request is unknown (never registered, already completed, or evicted).
    pub(crate) fn push_progress(&self, message_id: &str, data: Value) {
        if let Some(entry) = self.in_flight.get(message_id) {
            let sequence = entry.sequence.fetch_add(1, Ordering::SeqCst);
            let _ = entry.progress.send(ProgressUpdate { sequence, data });
        }
    }

    /// Fulfill `message_id`'s completion future exactly once. A duplicate
    /// call (the id already removed from `in_flight`) is a no-op.
    pub(crate) fn complete(&self, message_id: &str, response: ActorResponse) {
        if let Some((id, entry)) = self.in_flight.remove(message_id) {
            let _ = entry.completion.send(response);
            self.completed.lock().put(id, ());
        }
    }

    pub(crate) fn has_completed(&self, message_id: &str) -> bool {
        self.completed.lock().contains(message_id)
    }

    /// Drain every still-in-flight request and complete it as
    /// `Failed(Cancelled)` — used on actor shutdown.
    pub(crate) fn cancel_all(&self, actor_id_display: &str) {
        let ids: Vec<String> = self.in_flight.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.complete(
                &id,
                ActorResponse {
                    message_id: id.clone(),
                    status: crate::handle::ActorResponseStatus::Failed,
                    data: Some(serde_json::json!({ "message": format!("actor {actor_id_display} cancelled"), "kind": "Cancelled" })),
                    sender_id: None,
                },
            );
        }
    }
}
