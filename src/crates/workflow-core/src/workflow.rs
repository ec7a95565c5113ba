//! The assembled, immutable workflow graph (SPEC_FULL §4.1).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::edge_group::{EdgeGroup, HandlerLookup};
use crate::executor::{Executor, HandlerEntry, ResponseHandlerEntry};

/// `(conversation-or-output data) -> bool`, checked at every suspension
/// boundary (SPEC_FULL §4.2). Defaults to "never" when unset.
pub type TerminationConditionFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A built, ready-to-run graph: executors plus the edge groups connecting
/// them. Construct via [`crate::WorkflowBuilder::build`] — this type carries
/// no public constructor of its own because every invariant it upholds
/// (unknown executors, arity rules, duplicate response handlers) is checked
/// once at build time rather than on every run.
pub struct Workflow {
    pub(crate) start_id: String,
    pub(crate) executors: HashMap<String, Arc<dyn Executor>>,
    pub(crate) handlers: HashMap<String, Vec<HandlerEntry>>,
    pub(crate) response_handlers: HashMap<String, Vec<ResponseHandlerEntry>>,
    pub(crate) edge_groups: Vec<EdgeGroup>,
    pub(crate) checkpointing_enabled: bool,
    pub(crate) termination_condition: Option<TerminationConditionFn>,
}

impl Workflow {
    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn checkpointing_enabled(&self) -> bool {
        self.checkpointing_enabled
    }

    /// Evaluate the declared termination condition, if any, against `data`.
    /// Absent a condition the run only ends on a drained queue or an
    /// explicit `WorkflowOutputEvent`.
    pub fn should_terminate(&self, data: &Value) -> bool {
        self.termination_condition.as_ref().map_or(false, |f| f(data))
    }

    /// Whether a termination condition was declared at all, so callers can
    /// skip building a state snapshot to evaluate against on every superstep.
    pub fn has_termination_condition(&self) -> bool {
        self.termination_condition.is_some()
    }

    pub fn executor(&self, id: &str) -> Option<&Arc<dyn Executor>> {
        self.executors.get(id)
    }

    pub fn executor_ids(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }

    /// Edge groups that route messages emitted by `executor_id`, in
    /// declaration order.
    pub fn outgoing(&self, executor_id: &str) -> impl Iterator<Item = &EdgeGroup> {
        self.edge_groups.iter().filter(move |g| g.sources().contains(&executor_id))
    }

    /// Edge groups that can deliver into `executor_id` as a fan-in target.
    pub fn fan_in_groups_into(&self, executor_id: &str) -> impl Iterator<Item = &EdgeGroup> {
        self.edge_groups.iter().filter(move |g| g.is_fan_in_into(executor_id))
    }

    pub fn response_handler(&self, executor_id: &str, request_type: &str, response_type: &str) -> Option<&ResponseHandlerEntry> {
        self.response_handlers
            .get(executor_id)?
            .iter()
            .find(|h| h.request_type_tag == request_type && h.response_type_tag == response_type)
    }

    /// All response handlers declared by `executor_id`, in registration
    /// order — used by the request/response-type-compatibility fallback in
    /// `workflow-runtime` (SPEC_FULL §4.3).
    pub fn response_handlers_for(&self, executor_id: &str) -> &[ResponseHandlerEntry] {
        self.response_handlers.get(executor_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl HandlerLookup for Workflow {
    fn can_handle(&self, target_id: &str, type_tag: &str) -> bool {
        self.handlers
            .get(target_id)
            .map(|entries| entries.iter().any(|h| h.input_type_tag == type_tag))
            .unwrap_or(false)
    }
}
