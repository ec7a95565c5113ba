//! The [`ExecutionContext`] handlers actually run against: writes to shared
//! state and outgoing messages are buffered on channels and only become
//! visible once the enclosing superstep's barrier is crossed
//! (SPEC_FULL §3, `SharedState` doc comment).

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use workflow_core::{ExecutionContext, SharedState, WorkflowEvent};

pub(crate) struct RunnerContext {
    executor_id: String,
    /// Read-only view pinned to the start of the current superstep.
    read_view: SharedState,
    outgoing: UnboundedSender<(Value, String, Option<String>, String)>,
    events: UnboundedSender<WorkflowEvent>,
    writes: UnboundedSender<(String, Value)>,
    requests: UnboundedSender<(String, String, String, Value)>,
}

impl RunnerContext {
    pub(crate) fn new(
        executor_id: String,
        read_view: SharedState,
        outgoing: UnboundedSender<(Value, String, Option<String>, String)>,
        events: UnboundedSender<WorkflowEvent>,
        writes: UnboundedSender<(String, Value)>,
        requests: UnboundedSender<(String, String, String, Value)>,
    ) -> Self {
        Self { executor_id, read_view, outgoing, events, writes, requests }
    }
}

#[async_trait]
impl ExecutionContext for RunnerContext {
    fn executor_id(&self) -> &str {
        &self.executor_id
    }

    async fn send_message(&self, data: Value, type_tag: String, target_id: Option<String>) {
        let _ = self.outgoing.send((data, type_tag, target_id, self.executor_id.clone()));
    }

    fn add_event(&self, event: WorkflowEvent) {
        let _ = self.events.send(event);
    }

    fn get_shared_state(&self, key: &str) -> Option<Value> {
        self.read_view.get(key)
    }

    fn set_shared_state(&self, key: &str, value: Value) {
        let _ = self.writes.send((key.to_string(), value));
    }

    async fn request_info(&self, request_type_tag: String, payload: Value) -> String {
        let request_id = Uuid::new_v4().to_string();
        let _ = self.events.send(WorkflowEvent::RequestInfoEvent { request_id: request_id.clone(), payload: payload.clone() });
        let _ = self.requests.send((request_id.clone(), self.executor_id.clone(), request_type_tag, payload));
        request_id
    }
}
