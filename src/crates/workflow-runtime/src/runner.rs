//! The superstep scheduler (SPEC_FULL §4.2): drains the current message
//! frontier each superstep, runs every invoked handler concurrently, applies
//! writes and routes new messages at the barrier, and repeats until the
//! queue drains, a handler emits `WorkflowOutputEvent`, or the declared
//! termination condition fires.

use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use workflow_checkpoint::{CheckpointId, WorkflowCheckpointSaver};
use workflow_core::{Delivery, EdgeGroup, ErrorKind, HandlerError, Message, RouteError, SharedState, SharedStateSnapshot, Workflow, WorkflowEvent};

use crate::cancel::CancelSignal;
use crate::context::RunnerContext;
use crate::request_response::{self, PendingRequest, PendingRequests, PendingResponseDispatch};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("routing failure: {0}")]
    Route(#[from] RouteError),
    #[error("handler task failure: {0}")]
    Handler(#[from] HandlerError),
    #[error("checkpoint failure: {0}")]
    Checkpoint(#[from] workflow_checkpoint::CheckpointError),
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Everything a [`WorkflowCheckpointSaver`] persists at a superstep boundary
/// (SPEC_FULL §4.2).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RunSnapshot {
    pub superstep: u64,
    pub message_queue: Vec<Message>,
    pub shared_state: SharedStateSnapshot,
    pub fan_in_buffers: HashMap<String, HashMap<String, Value>>,
    pub pending_requests: PendingRequests,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed { output: Option<Value> },
    Suspended { pending_request_ids: Vec<String> },
    Failed { kind: ErrorKind, detail: String },
}

#[derive(Debug)]
pub struct RunOutcome {
    pub events: Vec<WorkflowEvent>,
    pub status: RunStatus,
}

/// Drives one run of a [`Workflow`]. Not `Clone` — a run has exactly one
/// owner; share it across tasks behind a lock if a caller needs to call
/// [`Self::cancel_signal`] from elsewhere.
pub struct WorkflowRunner {
    workflow: Arc<Workflow>,
    run_id: String,
    shared_state: SharedState,
    superstep: u64,
    frontier: Vec<Message>,
    fan_in_buffers: HashMap<String, HashMap<String, Value>>,
    pending_requests: PendingRequests,
    /// Resolved `@response_handler` calls waiting to be invoked by the next
    /// [`Self::run_superstep`] (SPEC_FULL §4.3). Not part of [`RunSnapshot`]:
    /// a `ResponseHandlerFn` closure can't be serialized, the same reason
    /// `checkpoint_saver` itself isn't restored by [`Self::from_snapshot`].
    response_dispatches: Vec<PendingResponseDispatch>,
    cancel: CancelSignal,
    checkpoint_saver: Option<Arc<dyn WorkflowCheckpointSaver>>,
}

impl WorkflowRunner {
    pub fn new(workflow: Arc<Workflow>, run_id: impl Into<String>) -> Self {
        Self {
            workflow,
            run_id: run_id.into(),
            shared_state: SharedState::new(),
            superstep: 0,
            frontier: Vec::new(),
            fan_in_buffers: HashMap::new(),
            pending_requests: HashMap::new(),
            response_dispatches: Vec::new(),
            cancel: CancelSignal::new(),
            checkpoint_saver: None,
        }
    }

    pub fn with_checkpoint_saver(mut self, saver: Arc<dyn WorkflowCheckpointSaver>) -> Self {
        self.checkpoint_saver = Some(saver);
        self
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn from_snapshot(workflow: Arc<Workflow>, run_id: impl Into<String>, snapshot: RunSnapshot) -> Self {
        Self {
            workflow,
            run_id: run_id.into(),
            shared_state: SharedState::from_snapshot(snapshot.shared_state),
            superstep: snapshot.superstep,
            frontier: snapshot.message_queue,
            fan_in_buffers: snapshot.fan_in_buffers,
            pending_requests: snapshot.pending_requests,
            response_dispatches: Vec::new(),
            cancel: CancelSignal::new(),
            checkpoint_saver: None,
        }
    }

    fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            superstep: self.superstep,
            message_queue: self.frontier.clone(),
            shared_state: self.shared_state.snapshot(),
            fan_in_buffers: self.fan_in_buffers.clone(),
            pending_requests: self.pending_requests.clone(),
        }
    }

    async fn checkpoint(&self) -> RunnerResult<Option<CheckpointId>> {
        let Some(saver) = &self.checkpoint_saver else { return Ok(None) };
        if !self.workflow.checkpointing_enabled() {
            return Ok(None);
        }
        let payload = serde_json::to_value(self.snapshot()).map_err(workflow_checkpoint::CheckpointError::Serialization)?;
        let id = saver.put(&self.run_id, self.superstep, payload).await?;
        Ok(Some(id))
    }

    /// Seed the run with an initial message targeted at the workflow's
    /// start executor.
    pub fn start(&mut self, input: Value, input_type_tag: String) {
        self.frontier.push(Message {
            data: input,
            type_tag: input_type_tag,
            source_id: "__start__".to_string(),
            target_id: Some(self.workflow.start_id().to_string()),
            trace_context: None,
        });
    }

    /// Inject responses for previously suspended requests and let the next
    /// [`Self::run`] call resume processing them (SPEC_FULL §3 "Suspension
    /// and resumption").
    pub fn send_responses(&mut self, responses: HashMap<String, (Value, String)>) {
        for (request_id, (data, type_tag)) in responses {
            let Some(pending) = self.pending_requests.remove(&request_id) else {
                warn!(request_id, "sendResponses referenced an unknown or already-resolved request id");
                continue;
            };
            if let Some(entry) = request_response::resolve_handler(&self.workflow, &pending.executor_id, &pending.request_type_tag, &type_tag) {
                let request = pending.as_message();
                let response = request_response::response_message(&pending.executor_id, entry.response_type_tag.clone(), data);
                self.response_dispatches.push(PendingResponseDispatch {
                    executor_id: pending.executor_id.clone(),
                    request,
                    response,
                    handler: entry.handler.clone(),
                });
            } else {
                self.frontier.push(Message {
                    data,
                    type_tag,
                    source_id: "__response__".to_string(),
                    target_id: Some(pending.executor_id.clone()),
                    trace_context: Some(Value::String(request_id)),
                });
            }
        }
    }

    /// Run supersteps until the queue drains, a suspension point is hit, or
    /// a fatal error aborts the run.
    pub async fn run(&mut self) -> RunnerResult<RunOutcome> {
        let mut events = Vec::new();
        loop {
            if self.cancel.is_cancelled() {
                events.push(WorkflowEvent::error(None, ErrorKind::Cancelled, "run cancelled"));
                return Ok(RunOutcome { events, status: RunStatus::Failed { kind: ErrorKind::Cancelled, detail: "cancelled".into() } });
            }

            if self.frontier.is_empty() && self.response_dispatches.is_empty() {
                if !self.pending_requests.is_empty() {
                    let ids = self.pending_requests.keys().cloned().collect();
                    return Ok(RunOutcome { events, status: RunStatus::Suspended { pending_request_ids: ids } });
                }
                return Ok(RunOutcome { events, status: RunStatus::Completed { output: None } });
            }

            match self.run_superstep(&mut events).await? {
                Some(status) => return Ok(RunOutcome { events, status }),
                None => {
                    self.superstep += 1;
                    self.checkpoint().await?;
                }
            }
        }
    }

    /// Runs one superstep. Returns `Some(status)` when the run should stop
    /// (terminal output, cancellation, or a fatal structural error).
    async fn run_superstep(&mut self, events: &mut Vec<WorkflowEvent>) -> RunnerResult<Option<RunStatus>> {
        let mut by_target: HashMap<String, Vec<Message>> = HashMap::new();
        for msg in self.frontier.drain(..) {
            if let Some(target) = msg.target_id.clone() {
                by_target.entry(target).or_default().push(msg);
            }
        }

        let read_view = SharedState::from_snapshot(self.shared_state.snapshot());
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (writes_tx, mut writes_rx) = mpsc::unbounded_channel();
        let (requests_tx, mut requests_rx) = mpsc::unbounded_channel();

        let mut handles = Vec::new();
        for (target, messages) in by_target {
            let Some(executor) = self.workflow.executor(&target).cloned() else {
                events.push(WorkflowEvent::error(Some(target.clone()), ErrorKind::NoHandler, "executor not registered"));
                continue;
            };
            let handler_entries = executor.handlers();
            for msg in messages {
                events.push(WorkflowEvent::ExecutorInvoked { executor_id: target.clone(), input: msg.data.clone() });
                let Some(entry) = handler_entries.iter().find(|h| h.input_type_tag == msg.type_tag) else {
                    events.push(WorkflowEvent::error(Some(target.clone()), ErrorKind::NoHandler, format!("no handler registered for type {}", msg.type_tag)));
                    continue;
                };
                let handler = entry.handler.clone();
                let ctx: Arc<dyn workflow_core::ExecutionContext> = Arc::new(RunnerContext::new(
                    target.clone(),
                    read_view.clone(),
                    outgoing_tx.clone(),
                    events_tx.clone(),
                    writes_tx.clone(),
                    requests_tx.clone(),
                ));
                let executor_id = target.clone();
                handles.push(tokio::spawn(async move { (executor_id, handler(msg, ctx).await) }));
            }
        }

        for dispatch in std::mem::take(&mut self.response_dispatches) {
            let executor_id = dispatch.executor_id.clone();
            events.push(WorkflowEvent::ExecutorInvoked { executor_id: executor_id.clone(), input: dispatch.response.data.clone() });
            let ctx: Arc<dyn workflow_core::ExecutionContext> = Arc::new(RunnerContext::new(
                executor_id.clone(),
                read_view.clone(),
                outgoing_tx.clone(),
                events_tx.clone(),
                writes_tx.clone(),
                requests_tx.clone(),
            ));
            handles.push(tokio::spawn(async move { (executor_id, dispatch.run(ctx).await) }));
        }

        drop(outgoing_tx);
        drop(events_tx);
        drop(writes_tx);
        drop(requests_tx);

        let joined = join_all(handles).await;

        while let Some(evt) = events_rx.recv().await {
            events.push(evt);
        }
        while let Some((key, value)) = writes_rx.recv().await {
            self.shared_state.set(key, value);
        }
        while let Some((request_id, executor_id, request_type_tag, payload)) = requests_rx.recv().await {
            self.pending_requests.insert(request_id, PendingRequest { executor_id, request_type_tag, payload });
        }

        for joined_result in joined {
            match joined_result {
                Ok((executor_id, Ok(()))) => {
                    events.push(WorkflowEvent::ExecutorCompleted { executor_id, output: Value::Null });
                }
                Ok((executor_id, Err(handler_err))) => {
                    events.push(WorkflowEvent::error(Some(executor_id), ErrorKind::Handler, handler_err.to_string()));
                    return Ok(Some(RunStatus::Failed { kind: ErrorKind::Handler, detail: handler_err.to_string() }));
                }
                Err(join_err) => return Err(RunnerError::Handler(HandlerError::new(join_err.to_string()))),
            }
        }

        while let Some((data, type_tag, target_id, source_id)) = outgoing_rx.recv().await {
            let message = Message { data, type_tag, source_id, target_id, trace_context: None };
            if let Some(fatal) = self.route_outgoing(message, events)? {
                return Ok(Some(fatal));
            }
        }

        for evt in events.iter() {
            if let WorkflowEvent::WorkflowOutputEvent { data } = evt {
                return Ok(Some(RunStatus::Completed { output: Some(data.clone()) }));
            }
        }

        if self.workflow.has_termination_condition() {
            let state = serde_json::to_value(self.shared_state.snapshot()).unwrap_or(Value::Null);
            if self.workflow.should_terminate(&state) {
                return Ok(Some(RunStatus::Completed { output: Some(state) }));
            }
        }

        debug!(superstep = self.superstep, "superstep complete");
        Ok(None)
    }

    /// Route one emitted message through every outgoing edge group from its
    /// source, buffering fan-in contributions and enqueuing immediate
    /// deliveries for the next superstep. Returns `Some(status)` only for a
    /// fatal structural failure.
    fn route_outgoing(&mut self, message: Message, events: &mut Vec<WorkflowEvent>) -> RunnerResult<Option<RunStatus>> {
        let groups: Vec<EdgeGroup> = self.workflow.outgoing(&message.source_id).cloned().collect();
        if groups.is_empty() {
            debug!(source = %message.source_id, "message has no outgoing edges; dropped");
            return Ok(None);
        }

        for group in &groups {
            match group.route(self.workflow.as_ref(), &message) {
                Ok(Delivery::Immediate(pairs)) => {
                    for (target, data) in pairs {
                        self.frontier.push(Message {
                            data,
                            type_tag: message.type_tag.clone(),
                            source_id: message.source_id.clone(),
                            target_id: Some(target),
                            trace_context: message.trace_context.clone(),
                        });
                    }
                }
                Ok(Delivery::Aggregate { target_id, source_id, item }) => {
                    self.buffer_and_maybe_flush(target_id, source_id, item, &message.type_tag);
                }
                Ok(Delivery::NoMatch) => {}
                Err(RouteError::NoHandler { target, type_tag }) => {
                    events.push(WorkflowEvent::error(Some(message.source_id.clone()), ErrorKind::NoHandler, format!("no handler on {target} for {type_tag}")));
                }
                Err(fatal @ RouteError::InvalidPartitionIndex { .. }) => {
                    events.push(WorkflowEvent::error(Some(message.source_id.clone()), ErrorKind::Partition, fatal.to_string()));
                    return Ok(Some(RunStatus::Failed { kind: ErrorKind::Partition, detail: fatal.to_string() }));
                }
                Err(fatal @ RouteError::Serialization(_)) => return Err(fatal.into()),
            }
        }
        Ok(None)
    }

    fn buffer_and_maybe_flush(&mut self, target_id: String, source_id: String, item: Value, item_type_tag: &str) {
        let required = self
            .workflow
            .fan_in_groups_into(&target_id)
            .find_map(|g| match g {
                EdgeGroup::Target { sources, .. } if sources.iter().any(|s| s == &source_id) => Some(sources.clone()),
                _ => None,
            });

        let buffer = self.fan_in_buffers.entry(target_id.clone()).or_default();
        buffer.insert(source_id, item);

        let Some(required) = required else { return };
        if !required.iter().all(|s| buffer.contains_key(s)) {
            return;
        }

        let items: Vec<Value> = required.iter().filter_map(|s| buffer.remove(s)).collect();
        if buffer.is_empty() {
            self.fan_in_buffers.remove(&target_id);
        }
        self.frontier.push(Message::aggregated(target_id.clone(), item_type_tag, items).with_target(target_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use workflow_core::{type_tag, Executor, FnExecutor, HandlerEntry, ResponseHandlerEntry, WorkflowBuilder};

    fn echo_executor(id: &str, next: Option<&str>) -> Arc<dyn Executor> {
        let next = next.map(|s| s.to_string());
        Arc::new(FnExecutor::new(
            id,
            type_tag::<String>(),
            Arc::new(move |msg, ctx| {
                let next = next.clone();
                Box::pin(async move {
                    if let Some(next_id) = next {
                        ctx.send_message(msg.data, type_tag::<String>(), Some(next_id)).await;
                    } else {
                        ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: msg.data });
                    }
                    Ok(())
                })
            }),
        ))
    }

    #[tokio::test]
    async fn linear_run_completes_and_produces_output() {
        let workflow = WorkflowBuilder::new()
            .add_executor(echo_executor("a", Some("b")))
            .unwrap()
            .add_executor(echo_executor("b", None))
            .unwrap()
            .add_edge("a", "b")
            .build()
            .unwrap();

        let mut runner = WorkflowRunner::new(Arc::new(workflow), "run-1");
        runner.start(Value::from("hi"), type_tag::<String>());
        let outcome = runner.run().await.unwrap();
        assert_eq!(outcome.status, RunStatus::Completed { output: Some(Value::from("hi")) });
    }

    #[tokio::test]
    async fn fan_out_then_fan_in_aggregates_all_sources() {
        let collected = Arc::new(parking_lot::Mutex::new(None));
        let collected_for_handler = collected.clone();
        let aggregator: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "agg",
            workflow_core::list_type_tag::<Value>(),
            Arc::new(move |msg, ctx| {
                let collected = collected_for_handler.clone();
                Box::pin(async move {
                    *collected.lock() = Some(msg.data.clone());
                    ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: msg.data });
                    Ok(())
                })
            }),
        ));

        let fan_out: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "start",
            type_tag::<Value>(),
            Arc::new(|msg, ctx| Box::pin(async move {
                ctx.send_message(msg.data.clone(), type_tag::<Value>(), None).await;
                Ok(())
            })),
        ));
        let left: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "left",
            type_tag::<Value>(),
            Arc::new(|_msg, ctx| Box::pin(async move {
                ctx.send_message(Value::from("left"), type_tag::<Value>(), None).await;
                Ok(())
            })),
        ));
        let right: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "right",
            type_tag::<Value>(),
            Arc::new(|_msg, ctx| Box::pin(async move {
                ctx.send_message(Value::from("right"), type_tag::<Value>(), None).await;
                Ok(())
            })),
        ));

        let workflow = WorkflowBuilder::new()
            .add_executor(fan_out)
            .unwrap()
            .add_executor(left)
            .unwrap()
            .add_executor(right)
            .unwrap()
            .add_executor(aggregator)
            .unwrap()
            .add_fan_out_edges("start", vec!["left".to_string(), "right".to_string()])
            .add_fan_in_edges(vec!["left".to_string(), "right".to_string()], "agg")
            .build()
            .unwrap();

        let mut runner = WorkflowRunner::new(Arc::new(workflow), "run-2");
        runner.start(Value::from("go"), type_tag::<Value>());
        let outcome = runner.run().await.unwrap();
        assert!(matches!(outcome.status, RunStatus::Completed { .. }));
        let collected = collected.lock().clone().unwrap();
        let mut items: Vec<String> = collected.as_array().unwrap().iter().map(|v| v.as_str().unwrap().to_string()).collect();
        items.sort();
        assert_eq!(items, vec!["left".to_string(), "right".to_string()]);
    }

    #[tokio::test]
    async fn suspension_and_resume_round_trips_through_send_responses() {
        let seen_response = Arc::new(AtomicUsize::new(0));
        let seen_for_handler = seen_response.clone();
        let waiting: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "asker",
            type_tag::<Value>(),
            Arc::new(move |msg, ctx| {
                let seen = seen_for_handler.clone();
                Box::pin(async move {
                    if msg.source_id == "__response__" {
                        seen.fetch_add(1, Ordering::SeqCst);
                        ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: msg.data });
                    } else {
                        let _id = ctx.request_info(type_tag::<Value>(), Value::from("need-input")).await;
                    }
                    Ok(())
                })
            }),
        ));

        let workflow = WorkflowBuilder::new().add_executor(waiting).unwrap().build().unwrap();
        let mut runner = WorkflowRunner::new(Arc::new(workflow), "run-3");
        runner.start(Value::from("start"), type_tag::<Value>());
        let outcome = runner.run().await.unwrap();
        let RunStatus::Suspended { pending_request_ids } = outcome.status else { panic!("expected suspension") };
        assert_eq!(pending_request_ids.len(), 1);

        let mut responses = HashMap::new();
        responses.insert(pending_request_ids[0].clone(), (Value::from("the answer"), type_tag::<Value>()));
        runner.send_responses(responses);
        let outcome = runner.run().await.unwrap();
        assert_eq!(outcome.status, RunStatus::Completed { output: Some(Value::from("the answer")) });
        assert_eq!(seen_response.load(Ordering::SeqCst), 1);
    }

    struct AskerWithResponseHandler {
        invocations: Arc<AtomicUsize>,
        captured: Arc<parking_lot::Mutex<Option<(Value, Value)>>>,
    }

    impl Executor for AskerWithResponseHandler {
        fn id(&self) -> &str {
            "asker"
        }

        fn handlers(&self) -> Vec<HandlerEntry> {
            vec![HandlerEntry {
                input_type_tag: type_tag::<Value>(),
                handler: Arc::new(|msg, ctx| Box::pin(async move {
                    let _id = ctx.request_info(type_tag::<Value>(), msg.data).await;
                    Ok(())
                })),
            }]
        }

        fn response_handlers(&self) -> Vec<ResponseHandlerEntry> {
            let invocations = self.invocations.clone();
            let captured = self.captured.clone();
            vec![ResponseHandlerEntry {
                request_type_tag: type_tag::<Value>(),
                response_type_tag: type_tag::<Value>(),
                handler: Arc::new(move |request, response, ctx| {
                    let invocations = invocations.clone();
                    let captured = captured.clone();
                    Box::pin(async move {
                        invocations.fetch_add(1, Ordering::SeqCst);
                        *captured.lock() = Some((request.data.clone(), response.data.clone()));
                        ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: response.data });
                        Ok(())
                    })
                }),
            }]
        }
    }

    #[tokio::test]
    async fn registered_response_handler_is_invoked_with_request_and_response() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let captured = Arc::new(parking_lot::Mutex::new(None));
        let asker = Arc::new(AskerWithResponseHandler { invocations: invocations.clone(), captured: captured.clone() });

        let workflow = WorkflowBuilder::new().add_executor(asker).unwrap().build().unwrap();
        let mut runner = WorkflowRunner::new(Arc::new(workflow), "run-4");
        runner.start(Value::from("need-input"), type_tag::<Value>());
        let outcome = runner.run().await.unwrap();
        let RunStatus::Suspended { pending_request_ids } = outcome.status else { panic!("expected suspension") };
        assert_eq!(pending_request_ids.len(), 1);

        let mut responses = HashMap::new();
        responses.insert(pending_request_ids[0].clone(), (Value::from("the real answer"), type_tag::<Value>()));
        runner.send_responses(responses);
        let outcome = runner.run().await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed { output: Some(Value::from("the real answer")) });
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        let (request_data, response_data) = captured.lock().clone().unwrap();
        assert_eq!(request_data, Value::from("need-input"));
        assert_eq!(response_data, Value::from("the real answer"));
    }

    #[tokio::test]
    async fn termination_condition_evaluates_against_shared_state_each_superstep() {
        let counter: Arc<dyn Executor> = Arc::new(FnExecutor::new(
            "counter",
            type_tag::<Value>(),
            Arc::new(|_msg, ctx| {
                Box::pin(async move {
                    let count = ctx.get_shared_state("count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
                    ctx.set_shared_state("count", Value::from(count));
                    ctx.send_message(Value::Null, type_tag::<Value>(), Some("counter".to_string())).await;
                    Ok(())
                })
            }),
        ));

        let workflow = WorkflowBuilder::new()
            .add_executor(counter)
            .unwrap()
            .add_edge("counter", "counter")
            .with_termination_condition(Arc::new(|state: &Value| state.get("count").and_then(|v| v.as_i64()).map_or(false, |c| c >= 3)))
            .build()
            .unwrap();

        let mut runner = WorkflowRunner::new(Arc::new(workflow), "run-5");
        runner.start(Value::Null, type_tag::<Value>());
        let outcome = runner.run().await.unwrap();

        let RunStatus::Completed { output: Some(state) } = outcome.status else { panic!("expected termination-condition completion") };
        assert_eq!(state["count"], Value::from(3));
    }
}
