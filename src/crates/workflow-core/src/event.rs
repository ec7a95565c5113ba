//! The event stream emitted during a workflow run (SPEC_FULL §3).

use serde_json::Value;

/// Kinds of non-fatal-by-default dispatch/handler errors, matching the
/// taxonomy in SPEC_FULL §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    NoHandler,
    NoResponseHandler,
    Handler,
    Cancelled,
    Partition,
}

/// Sum type emitted during a run.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    ExecutorInvoked { executor_id: String, input: Value },
    ExecutorCompleted { executor_id: String, output: Value },
    /// Bridge event carrying an agent-runtime interaction that occurred
    /// inside an executor (e.g. the handoff coordinator's participant
    /// invocations).
    AgentRunEvent { agent_id: String, messages: Value, is_streaming: bool },
    /// Pauses the run awaiting an external response (SPEC_FULL §4.2/§4.3).
    RequestInfoEvent { request_id: String, payload: Value },
    /// Terminal output for a run.
    WorkflowOutputEvent { data: Value },
    ErrorEvent { executor_id: Option<String>, kind: ErrorKind, detail: String },
}

impl WorkflowEvent {
    pub fn error(executor_id: Option<String>, kind: ErrorKind, detail: impl Into<String>) -> Self {
        WorkflowEvent::ErrorEvent { executor_id, kind, detail: detail.into() }
    }
}
