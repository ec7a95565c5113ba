//! The bidirectional response handle a caller gets back from
//! `ActorRuntime::send_request` (SPEC_FULL §4.4, §6, §9 "Bidirectional
//! response handle"). Grounded on `orchestrator::api::ws::handler`'s
//! subscribe-then-drain pattern, adapted from a broadcast channel to a
//! single-consumer oneshot-plus-progress pair since each request has exactly
//! one caller.

use futures::Stream;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::actor_id::ActorId;
use crate::error::{ActorError, Result};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ActorResponseStatus {
    Pending,
    Completed,
    Failed,
    NotFound,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActorResponse {
    pub message_id: String,
    pub status: ActorResponseStatus,
    pub data: Option<Value>,
    pub sender_id: Option<ActorId>,
}

/// One progress notification, carrying the monotone per-request sequence
/// number used to detect drops.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProgressUpdate {
    pub sequence: u64,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum WatchItem {
    Progress(ProgressUpdate),
    Terminal(ActorResponse),
}

/// Not `Clone` — one handle per request, matching the single-consumer
/// oneshot it wraps.
pub struct ActorResponseHandle {
    completion: oneshot::Receiver<ActorResponse>,
    progress: mpsc::UnboundedReceiver<ProgressUpdate>,
}

impl ActorResponseHandle {
    pub(crate) fn new(completion: oneshot::Receiver<ActorResponse>, progress: mpsc::UnboundedReceiver<ProgressUpdate>) -> Self {
        Self { completion, progress }
    }

    /// A handle that resolves immediately to `response`, with no progress —
    /// used for requests rejected before dispatch (e.g. a reused message id).
    pub(crate) fn resolved(response: ActorResponse) -> Self {
        let (completion_tx, completion_rx) = oneshot::channel();
        let _ = completion_tx.send(response);
        let (_progress_tx, progress_rx) = mpsc::unbounded_channel();
        Self { completion: completion_rx, progress: progress_rx }
    }

    /// Await only the terminal response, discarding any progress updates
    /// emitted along the way.
    pub async fn get_response(self) -> Result<ActorResponse> {
        self.completion.await.map_err(|_| ActorError::RequestNotFound("response sender dropped".to_string()))
    }

    /// Drains progress updates as they arrive, then — once the request
    /// completes — drains whatever progress is still buffered before
    /// yielding the terminal response exactly once.
    pub fn watch_updates(self) -> impl Stream<Item = WatchItem> + Send {
        let ActorResponseHandle { mut completion, mut progress } = self;
        async_stream::stream! {
            let mut progress_closed = false;
            loop {
                if progress_closed {
                    if let Ok(response) = (&mut completion).await {
                        yield WatchItem::Terminal(response);
                    }
                    break;
                }
                tokio::select! {
                    biased;
                    maybe_update = progress.recv() => {
                        match maybe_update {
                            Some(update) => yield WatchItem::Progress(update),
                            None => progress_closed = true,
                        }
                    }
                    result = &mut completion => {
                        while let Ok(update) = progress.try_recv() {
                            yield WatchItem::Progress(update);
                        }
                        if let Ok(response) = result {
                            yield WatchItem::Terminal(response);
                        }
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn get_response_returns_terminal_only() {
        let (completion_tx, completion_rx) = oneshot::channel();
        let (_progress_tx, progress_rx) = mpsc::unbounded_channel();
        let handle = ActorResponseHandle::new(completion_rx, progress_rx);

        completion_tx
            .send(ActorResponse { message_id: "m1".into(), status: ActorResponseStatus::Completed, data: Some(Value::from(1)), sender_id: None })
            .unwrap();

        let response = handle.get_response().await.unwrap();
        assert_eq!(response.status, ActorResponseStatus::Completed);
    }

    #[tokio::test]
    async fn watch_updates_drains_progress_before_terminal() {
        let (completion_tx, completion_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let handle = ActorResponseHandle::new(completion_rx, progress_rx);

        progress_tx.send(ProgressUpdate { sequence: 1, data: Value::from("step1") }).unwrap();
        progress_tx.send(ProgressUpdate { sequence: 2, data: Value::from("step2") }).unwrap();
        completion_tx
            .send(ActorResponse { message_id: "m1".into(), status: ActorResponseStatus::Completed, data: Some(Value::from("done")), sender_id: None })
            .unwrap();
        drop(progress_tx);

        let items: Vec<WatchItem> = handle.watch_updates().collect().await;
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], WatchItem::Progress(ProgressUpdate { sequence: 1, .. })));
        assert!(matches!(items[1], WatchItem::Progress(ProgressUpdate { sequence: 2, .. })));
        assert!(matches!(items[2], WatchItem::Terminal(_)));
    }
}
