//! Executors: addressable handler units with typed dispatch (SPEC_FULL §4.1).

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::event::WorkflowEvent;
use crate::message::Message;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error surfaced from within a handler body. Distinct from [`crate::error::RouteError`]/
/// [`crate::error::BuildError`] — those are routing/configuration failures
/// detected by the graph machinery, this is "the handler itself failed".
#[derive(Debug, Clone, thiserror::Error)]
#[error("handler error: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// What a handler may do: send further messages, emit events, and read or
/// write [`crate::SharedState`]. Implemented by `workflow-runtime`'s runner
/// context; kept as a trait here so `workflow-core` has no dependency on the
/// runner.
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    /// The id of the executor this handler is running for.
    fn executor_id(&self) -> &str;

    /// Send a new message. `target_id` absent broadcasts to every eligible
    /// edge from this executor (SPEC_FULL §3).
    async fn send_message(&self, data: Value, type_tag: String, target_id: Option<String>);

    fn add_event(&self, event: WorkflowEvent);

    fn get_shared_state(&self, key: &str) -> Option<Value>;

    fn set_shared_state(&self, key: &str, value: Value);

    /// Suspend the run awaiting an external response, registering `payload`
    /// under a freshly generated request id and this executor as the
    /// addressee for the eventual `sendResponses` call (SPEC_FULL §4.2/§4.3).
    /// Returns the request id so the handler can correlate it if it also
    /// registered a typed `response_handler`.
    async fn request_info(&self, request_type_tag: String, payload: Value) -> String;
}

pub type HandlerFn = Arc<dyn Fn(Message, Arc<dyn ExecutionContext>) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

pub type ResponseHandlerFn =
    Arc<dyn Fn(Message, Message, Arc<dyn ExecutionContext>) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// A declared `(inputMessageType, handlerFn)` pair.
#[derive(Clone)]
pub struct HandlerEntry {
    pub input_type_tag: String,
    pub handler: HandlerFn,
}

/// A declared `(requestType, responseType) -> handlerFn` pair for the
/// request/response mixin (SPEC_FULL §4.3).
#[derive(Clone)]
pub struct ResponseHandlerEntry {
    pub request_type_tag: String,
    pub response_type_tag: String,
    pub handler: ResponseHandlerFn,
}

/// An addressable unit of computation with a stable id and typed handlers.
///
/// Handler discovery is deferred until the workflow is assembled:
/// [`Executor::handlers`]/[`Executor::response_handlers`] are called once by
/// [`crate::WorkflowBuilder::build`], which also enforces the
/// no-duplicate-response-handler-key invariant (SPEC_FULL §4.1/§8).
pub trait Executor: Send + Sync {
    fn id(&self) -> &str;

    fn handlers(&self) -> Vec<HandlerEntry>;

    fn response_handlers(&self) -> Vec<ResponseHandlerEntry> {
        Vec::new()
    }
}

/// A minimal [`Executor`] built from a single closure, for tests and simple
/// pipeline stages — analogous to the teacher's `NodeSpec` with a bare
/// executor function and no channel reads/writes.
pub struct FnExecutor {
    id: String,
    input_type_tag: String,
    handler: HandlerFn,
}

impl FnExecutor {
    pub fn new(id: impl Into<String>, input_type_tag: impl Into<String>, handler: HandlerFn) -> Self {
        Self { id: id.into(), input_type_tag: input_type_tag.into(), handler }
    }
}

impl Executor for FnExecutor {
    fn id(&self) -> &str {
        &self.id
    }

    fn handlers(&self) -> Vec<HandlerEntry> {
        vec![HandlerEntry { input_type_tag: self.input_type_tag.clone(), handler: self.handler.clone() }]
    }
}
