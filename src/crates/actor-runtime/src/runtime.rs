//! `ActorRuntime`: create-on-first-request actor hosting, one cooperative
//! task per live actor, timeout-bounded shutdown (SPEC_FULL §4.4). Grounded
//! on `orchestrator::services::workflow::WorkflowServiceImpl`'s
//! construct-from-shared-resources shape, generalized from one gRPC service
//! to a dynamic table of many actor instances.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::actor_id::ActorId;
use crate::context::ActorContext;
use crate::error::{ActorError, Result};
use crate::handle::{ActorResponse, ActorResponseHandle, ActorResponseStatus};
use crate::registry::{ActorHandler, ActorRegistry};
use crate::state_store::StateStore;
use crate::table::Envelope;

const DEFAULT_RETENTION_CAP: usize = 128;

/// The caller-facing surface of the actor runtime — what `agent-actor` and
/// `handoff` depend on, rather than `ActorRuntime` directly, so either can be
/// exercised against a test double.
#[async_trait]
pub trait ActorClient: Send + Sync {
    async fn send_request(&self, actor_id: ActorId, method: String, params: Value, message_id: String) -> Result<ActorResponseHandle>;
}

struct ActorSlot {
    context: Arc<ActorContext>,
    inbox: mpsc::UnboundedSender<Envelope>,
    join_handle: JoinHandle<()>,
}

pub struct ActorRuntime {
    registry: ActorRegistry,
    state_store: Arc<dyn StateStore>,
    retention_cap: usize,
    actors: DashMap<ActorId, ActorSlot>,
}

impl ActorRuntime {
    pub fn new(state_store: Arc<dyn StateStore>) -> Self {
        Self::with_retention_cap(state_store, DEFAULT_RETENTION_CAP)
    }

    /// `retention_cap` bounds how many completed request ids each actor
    /// remembers to reject late duplicates; not proven tunable upstream,
    /// kept as a constructor parameter rather than hardwired (SPEC_FULL §9).
    pub fn with_retention_cap(state_store: Arc<dyn StateStore>, retention_cap: usize) -> Self {
        Self { registry: ActorRegistry::new(), state_store, retention_cap, actors: DashMap::new() }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    fn ensure_actor(&self, actor_id: &ActorId) -> Result<()> {
        if self.actors.contains_key(actor_id) {
            return Ok(());
        }
        let handler = self.registry.create(actor_id)?;
        let context = Arc::new(ActorContext::new(actor_id.clone(), self.state_store.clone(), self.retention_cap));
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let task_context = context.clone();
        let join_handle = tokio::spawn(run_actor_loop(handler, task_context, inbox_rx));
        self.actors.entry(actor_id.clone()).or_insert(ActorSlot { context, inbox: inbox_tx, join_handle });
        Ok(())
    }

    /// Enqueue one method call on `actor_id` under a fresh message id,
    /// spawning the actor on first use. Returns immediately with a handle;
    /// the call itself runs asynchronously on the actor's serial task.
    pub fn send_request(&self, actor_id: ActorId, method: impl Into<String>, params: Value) -> Result<ActorResponseHandle> {
        self.send_request_with_id(actor_id, method.into(), params, Uuid::new_v4().to_string())
    }

    /// As `send_request`, but the caller supplies `message_id`. Reusing an
    /// id that already completed within the retention window is rejected
    /// with a `NotFound` handle rather than re-dispatched to the actor.
    pub fn send_request_with_id(&self, actor_id: ActorId, method: String, params: Value, message_id: String) -> Result<ActorResponseHandle> {
        self.ensure_actor(&actor_id)?;
        let slot = self.actors.get(&actor_id).expect("ensure_actor just inserted this id");

        if slot.context.has_completed(&message_id) {
            return Ok(ActorResponseHandle::resolved(ActorResponse {
                message_id,
                status: ActorResponseStatus::NotFound,
                data: None,
                sender_id: Some(actor_id),
            }));
        }

        let (completion_tx, completion_rx) = oneshot::channel();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        slot.context.register_request(message_id.clone(), completion_tx, progress_tx);
        slot.inbox
            .send(Envelope { message_id, method, params })
            .map_err(|_| ActorError::ActorStopped(actor_id.clone()))?;

        Ok(ActorResponseHandle::new(completion_rx, progress_rx))
    }

    /// Signal every actor task to stop (close its inbox), await each with
    /// `timeout`, then drop it. Requests still in flight when their actor's
    /// task is torn down resolve `Failed(Cancelled)`.
    pub async fn shutdown(&self, timeout: Duration) {
        let actor_ids: Vec<ActorId> = self.actors.iter().map(|entry| entry.key().clone()).collect();
        for id in actor_ids {
            if let Some((_, slot)) = self.actors.remove(&id) {
                drop(slot.inbox);
                let _ = tokio::time::timeout(timeout, slot.join_handle).await;
                slot.context.cancel_pending();
            }
        }
    }
}

#[async_trait]
impl ActorClient for ActorRuntime {
    async fn send_request(&self, actor_id: ActorId, method: String, params: Value, message_id: String) -> Result<ActorResponseHandle> {
        self.send_request_with_id(actor_id, method, params, message_id)
    }
}

async fn run_actor_loop(handler: Arc<dyn ActorHandler>, ctx: Arc<ActorContext>, mut inbox: mpsc::UnboundedReceiver<Envelope>) {
    while let Some(envelope) = inbox.recv().await {
        let message_id = envelope.message_id.clone();
        let outcome = handler.handle(ctx.clone(), message_id.clone(), envelope.method, envelope.params).await;
        let response = match outcome {
            Ok(data) => ActorResponse { message_id: message_id.clone(), status: ActorResponseStatus::Completed, data: Some(data), sender_id: Some(ctx.actor_id().clone()) },
            Err(err) => ActorResponse {
                message_id: message_id.clone(),
                status: ActorResponseStatus::Failed,
                data: Some(serde_json::json!({ "message": err.to_string(), "kind": err.kind() })),
                sender_id: Some(ctx.actor_id().clone()),
            },
        };
        ctx.complete_request(&message_id, response);
    }
}
