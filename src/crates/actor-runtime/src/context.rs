//! `ActorContext`: what a running actor's handler sees — its own id, a
//! state-store handle scoped to it, and progress reporting for whichever
//! request it is currently servicing (SPEC_FULL §4.4).

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::actor_id::ActorId;
use crate::error::Result;
use crate::handle::{ActorResponse, ProgressUpdate};
use crate::state_store::StateStore;
use crate::table::RequestTable;

pub struct ActorContext {
    actor_id: ActorId,
    state_store: Arc<dyn StateStore>,
    requests: RequestTable,
}

impl ActorContext {
    pub(crate) fn new(actor_id: ActorId, state_store: Arc<dyn StateStore>, retention_cap: usize) -> Self {
        Self { actor_id, state_store, requests: RequestTable::new(retention_cap) }
    }

    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub async fn read_state(&self, key: &str) -> Result<Option<Value>> {
        self.state_store.read_state(&self.actor_id, key).await
    }

    pub async fn write_state(&self, key: &str, value: Value) -> Result<()> {
        self.state_store.write_state(&self.actor_id, key, value).await
    }

    pub async fn delete_state(&self, key: &str) -> Result<()> {
        self.state_store.delete_state(&self.actor_id, key).await
    }

    /// Report progress on `message_id`, assigning it the next sequence
    /// number. A no-op if `message_id` is unknown or already completed.
    pub fn on_progress_update(&self, message_id: &str, data: Value) {
        self.requests.push_progress(message_id, data);
    }

    pub(crate) fn register_request(&self, message_id: String, completion: oneshot::Sender<ActorResponse>, progress: mpsc::UnboundedSender<ProgressUpdate>) {
        self.requests.register(message_id, completion, progress);
    }

    /// Whether `message_id` has already been resolved (and is still within
    /// the retention window) — used to reject a reused id before dispatch.
    pub(crate) fn has_completed(&self, message_id: &str) -> bool {
        self.requests.has_completed(message_id)
    }

    pub(crate) fn complete_request(&self, message_id: &str, response: ActorResponse) {
        self.requests.complete(message_id, response);
    }

    pub(crate) fn cancel_pending(&self) {
        self.requests.cancel_all(&self.actor_id.to_string());
    }
}
