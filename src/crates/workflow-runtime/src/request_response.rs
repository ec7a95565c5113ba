//! Request/Response Mixin (SPEC_FULL §4.3): an executor emits a
//! [`workflow_core::event::ErrorKind`]-adjacent `RequestInfoEvent` that
//! suspends the run; the caller eventually supplies responses keyed by
//! request id, and each is dispatched back to the `(request_type,
//! response_type)` handler declared by the requesting executor.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use workflow_core::{ExecutionContext, Message, ResponseHandlerEntry, ResponseHandlerFn};

/// What the runner remembers about a suspended request while waiting for
/// [`crate::runner::WorkflowRunner::send_responses`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PendingRequest {
    pub executor_id: String,
    pub request_type_tag: String,
    pub payload: Value,
}

impl PendingRequest {
    /// Reconstruct the original `ctx.request_info(...)` call as a `Message`,
    /// the first argument a `@response_handler` is invoked with.
    pub fn as_message(&self) -> Message {
        Message {
            data: self.payload.clone(),
            type_tag: self.request_type_tag.clone(),
            source_id: self.executor_id.clone(),
            target_id: None,
            trace_context: None,
        }
    }
}

/// Resolution order from SPEC_FULL §4.3: exact `(request_type,
/// response_type)` match, then a same-`request_type` fallback regardless of
/// declared response type, then `None` (caller raises `NoResponseHandler`).
pub fn resolve_handler<'a>(
    workflow: &'a workflow_core::Workflow,
    executor_id: &str,
    request_type_tag: &str,
    response_type_tag: &str,
) -> Option<&'a ResponseHandlerEntry> {
    if let Some(entry) = workflow.response_handler(executor_id, request_type_tag, response_type_tag) {
        return Some(entry);
    }
    workflow.response_handlers_for(executor_id).iter().find(|h| h.request_type_tag == request_type_tag)
}

pub fn response_message(source_id: &str, type_tag: String, data: Value) -> Message {
    Message { data, type_tag, source_id: source_id.to_string(), target_id: None, trace_context: None }
}

/// A resolved `@response_handler` call awaiting execution: the runner invokes
/// `handler(request, response, ctx)` directly rather than routing it through
/// the ordinary message frontier (SPEC_FULL §4.3).
#[derive(Clone)]
pub struct PendingResponseDispatch {
    pub executor_id: String,
    pub request: Message,
    pub response: Message,
    pub handler: ResponseHandlerFn,
}

impl PendingResponseDispatch {
    pub async fn run(self, ctx: Arc<dyn ExecutionContext>) -> Result<(), workflow_core::HandlerError> {
        (self.handler)(self.request, self.response, ctx).await
    }
}

pub type PendingRequests = HashMap<String, PendingRequest>;
