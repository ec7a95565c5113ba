//! Integration tests covering SPEC_FULL §8 handoff scenarios 2-4.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agent_actor::{Agent, AgentError, AgentRunResponse};
use async_trait::async_trait;
use chat_contract::message::props;
use chat_contract::{AgentThread, ChatMessage, Role};
use handoff::{AwaitingInput, HandoffCoordinatorBuilder, HandoffTurn, Participants};
use serde_json::json;
use workflow_core::{type_tag, Executor, WorkflowBuilder, WorkflowEvent};
use workflow_runtime::{RunStatus, WorkflowRunner};

struct HandsOffTo {
    calls: Arc<AtomicUsize>,
    reply_text: &'static str,
    target: &'static str,
}

#[async_trait]
impl Agent for HandsOffTo {
    async fn run(&self, _messages: Vec<ChatMessage>, _thread: &mut AgentThread) -> Result<AgentRunResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut reply = ChatMessage::assistant(self.reply_text);
        reply.additional_properties = Some(props([("handoff_to", json!(self.target))]));
        Ok(AgentRunResponse { messages: vec![reply], usage: None })
    }
}

struct NeverHandsOff {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Agent for NeverHandsOff {
    async fn run(&self, _messages: Vec<ChatMessage>, _thread: &mut AgentThread) -> Result<AgentRunResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AgentRunResponse::text("handled"))
    }
}

/// Hands off to `escalation` only when the latest user turn mentions
/// "complex"; otherwise replies plainly.
struct Specialist {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Agent for Specialist {
    async fn run(&self, messages: Vec<ChatMessage>, _thread: &mut AgentThread) -> Result<AgentRunResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let escalate = messages.iter().rev().find(|m| m.role == Role::User).map(|m| m.text_content().contains("complex")).unwrap_or(false);
        let mut reply = ChatMessage::assistant("working the ticket");
        if escalate {
            reply.additional_properties = Some(props([("handoff_to", json!("escalation"))]));
        }
        Ok(AgentRunResponse { messages: vec![reply], usage: None })
    }
}

fn turn(text: &str) -> (serde_json::Value, String) {
    (serde_json::to_value(HandoffTurn { message: ChatMessage::user(text) }).unwrap(), type_tag::<HandoffTurn>())
}

/// Scenario 2: handoff specialist chain.
#[tokio::test]
async fn handoff_specialist_chain_terminates_once_two_user_turns_seen() {
    let triage_calls = Arc::new(AtomicUsize::new(0));
    let specialist_calls = Arc::new(AtomicUsize::new(0));
    let escalation_calls = Arc::new(AtomicUsize::new(0));

    let mut instances: HashMap<String, Arc<dyn Agent>> = HashMap::new();
    instances.insert("triage".to_string(), Arc::new(HandsOffTo { calls: triage_calls.clone(), reply_text: "routing", target: "specialist" }));
    instances.insert("specialist".to_string(), Arc::new(Specialist { calls: specialist_calls.clone() }));
    instances.insert("escalation".to_string(), Arc::new(NeverHandsOff { calls: escalation_calls.clone() }));

    let coordinator = HandoffCoordinatorBuilder::new("coordinator")
        .coordinator("triage")
        .participants(Participants::instances(instances))
        .allowed_handoff("triage", "specialist")
        .allowed_handoff("specialist", "escalation")
        .with_termination_condition(Arc::new(|conversation: &[ChatMessage]| conversation.iter().filter(|m| m.role == Role::User).count() >= 2))
        .build()
        .unwrap();

    let workflow = WorkflowBuilder::new().add_executor(Arc::new(coordinator) as Arc<dyn Executor>).unwrap().build().unwrap();
    let mut runner = WorkflowRunner::new(Arc::new(workflow), "scenario-2");

    let (data, tag) = turn("Need technical support");
    runner.start(data, tag);
    let outcome = runner.run().await.unwrap();
    assert!(matches!(outcome.status, RunStatus::Suspended { .. }), "first turn should pause awaiting the next user message");
    assert!(specialist_calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(escalation_calls.load(Ordering::SeqCst), 0);

    let RunStatus::Suspended { pending_request_ids } = outcome.status else { unreachable!() };
    let (data, tag) = turn("This is complex");
    let mut responses = HashMap::new();
    responses.insert(pending_request_ids[0].clone(), (data, tag));
    runner.send_responses(responses);
    let outcome = runner.run().await.unwrap();

    assert!(matches!(outcome.status, RunStatus::Completed { .. }));
    assert!(escalation_calls.load(Ordering::SeqCst) >= 1);
    assert!(triage_calls.load(Ordering::SeqCst) >= 1);
}

/// Scenario 3: return-to-previous keeps routing to the last specialist that
/// spoke instead of bouncing back to the coordinator.
#[tokio::test]
async fn return_to_previous_keeps_routing_to_the_last_specialist() {
    let triage_calls = Arc::new(AtomicUsize::new(0));
    let a_calls = Arc::new(AtomicUsize::new(0));
    let b_calls = Arc::new(AtomicUsize::new(0));

    let mut instances: HashMap<String, Arc<dyn Agent>> = HashMap::new();
    instances.insert("triage".to_string(), Arc::new(HandsOffTo { calls: triage_calls.clone(), reply_text: "routing", target: "specialist_a" }));
    instances.insert("specialist_a".to_string(), Arc::new(HandsOffTo { calls: a_calls.clone(), reply_text: "escalating", target: "specialist_b" }));
    instances.insert("specialist_b".to_string(), Arc::new(NeverHandsOff { calls: b_calls.clone() }));

    let coordinator = HandoffCoordinatorBuilder::new("coordinator")
        .coordinator("triage")
        .participants(Participants::instances(instances))
        .allowed_handoff("triage", "specialist_a")
        .allowed_handoff("specialist_a", "specialist_b")
        .with_return_to_previous(true)
        .build()
        .unwrap();

    let workflow = WorkflowBuilder::new().add_executor(Arc::new(coordinator) as Arc<dyn Executor>).unwrap().build().unwrap();
    let mut runner = WorkflowRunner::new(Arc::new(workflow), "scenario-3");

    let (data, tag) = turn("turn one");
    runner.start(data, tag);
    let mut outcome = runner.run().await.unwrap();

    for turn_text in ["turn two", "turn three"] {
        let RunStatus::Suspended { pending_request_ids } = outcome.status else { panic!("expected suspension") };
        let (data, tag) = turn(turn_text);
        let mut responses = HashMap::new();
        responses.insert(pending_request_ids[0].clone(), (data, tag));
        runner.send_responses(responses);
        outcome = runner.run().await.unwrap();
    }

    assert_eq!(triage_calls.load(Ordering::SeqCst), 1, "coordinator only runs on the very first turn");
    assert!(b_calls.load(Ordering::SeqCst) >= 3, "specialist_b should be invoked on every turn after the initial handoff chain");

    let awaiting = outcome.events.iter().rev().find_map(|e| match e {
        WorkflowEvent::RequestInfoEvent { payload, .. } => serde_json::from_value::<AwaitingInput>(payload.clone()).ok(),
        _ => None,
    });
    assert_eq!(awaiting.unwrap().awaiting_agent_id, "specialist_b");
}

/// Scenario 4: autonomous mode re-invokes the same worker until the turn
/// limit is reached, without ever pausing for user input.
#[tokio::test]
async fn autonomous_mode_stops_at_the_turn_limit_with_no_request_info() {
    let worker_calls = Arc::new(AtomicUsize::new(0));
    let mut instances: HashMap<String, Arc<dyn Agent>> = HashMap::new();
    instances.insert("worker".to_string(), Arc::new(NeverHandsOff { calls: worker_calls.clone() }));

    let coordinator = HandoffCoordinatorBuilder::new("coordinator")
        .coordinator("worker")
        .participants(Participants::instances(instances))
        .autonomous(2)
        .with_termination_condition(Arc::new(|_: &[ChatMessage]| false))
        .build()
        .unwrap();

    let workflow = WorkflowBuilder::new().add_executor(Arc::new(coordinator) as Arc<dyn Executor>).unwrap().build().unwrap();
    let mut runner = WorkflowRunner::new(Arc::new(workflow), "scenario-4");

    let (data, tag) = turn("Start");
    runner.start(data, tag);
    let outcome = runner.run().await.unwrap();

    assert_eq!(worker_calls.load(Ordering::SeqCst), 2);
    assert!(matches!(outcome.status, RunStatus::Completed { .. }));
    assert!(!outcome.events.iter().any(|e| matches!(e, WorkflowEvent::RequestInfoEvent { .. })));
}
