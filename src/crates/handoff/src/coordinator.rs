//! The handoff coordinator, built as a single [`workflow_core::Executor`]
//! rather than a bespoke state machine (SPEC_FULL §4.6) — grounded on
//! `orchestrator::router::supervisor::Router`'s route-selection and
//! termination-check shape, and on `orchestrator::pattern::registry`'s
//! factory-vs-instance participant idiom, folded into one executor so the
//! existing `workflow-runtime` checkpoint/suspend machinery applies
//! unchanged instead of a router loop driven from outside the graph.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use agent_actor::Agent;
use chat_contract::{AgentThread, ChatMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use workflow_core::{type_tag, ErrorKind, ExecutionContext, Executor, HandlerEntry, HandlerError, Message, WorkflowEvent};

use crate::participants::Participants;
use crate::signal::detect_handoff;

/// Namespace key the coordinator's `{ current_agent_id, previous_agent_id,
/// turns_in_autonomous }` snapshot lives under in `SharedState`.
pub const STATE_KEY: &str = "handoff_coordinator";
/// Key the accumulated conversation is persisted under, alongside the
/// coordinator state, so a restored run has both.
pub const CONVERSATION_KEY: &str = "handoff_conversation";

/// One new message delivered to the coordinator — either the first turn of
/// a run, or a resumed `sendResponses` call after a `human_in_loop` pause.
/// Both cases use this same type tag, so the coordinator only ever declares
/// one handler entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffTurn {
    pub message: ChatMessage,
}

/// Payload of the `RequestInfoEvent` emitted in `human_in_loop` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwaitingInput {
    pub conversation: Vec<ChatMessage>,
    pub awaiting_agent_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    HumanInLoop,
    Autonomous,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CoordinatorState {
    current_agent_id: String,
    previous_agent_id: Option<String>,
    turns_in_autonomous: u32,
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("handoff coordinator requires a coordinator id")]
    MissingCoordinator,
    #[error("handoff coordinator requires participants")]
    MissingParticipants,
    #[error("coordinator id {0:?} is not among the registered participants")]
    UnknownCoordinator(String),
    #[error("autonomous mode requires autonomous_turn_limit > 0")]
    InvalidAutonomousTurnLimit,
}

/// `(conversation) -> bool`, checked after every agent reply (SPEC_FULL
/// §4.6 "checked at every boundary").
pub type TerminationFn = Arc<dyn Fn(&[ChatMessage]) -> bool + Send + Sync>;

struct Inner {
    id: String,
    coordinator_id: String,
    participants: Participants,
    allowed_handoffs: HashMap<String, HashSet<String>>,
    mode: InteractionMode,
    autonomous_turn_limit: u32,
    return_to_previous_enabled: bool,
    termination_condition: TerminationFn,
}

/// Builds a [`HandoffCoordinator`], validating participant/mode
/// configuration eagerly rather than failing mid-run.
pub struct HandoffCoordinatorBuilder {
    id: String,
    coordinator_id: Option<String>,
    participants: Option<Participants>,
    allowed_handoffs: HashMap<String, HashSet<String>>,
    mode: InteractionMode,
    autonomous_turn_limit: u32,
    return_to_previous_enabled: bool,
    termination_condition: Option<TerminationFn>,
}

impl HandoffCoordinatorBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinator_id: None,
            participants: None,
            allowed_handoffs: HashMap::new(),
            mode: InteractionMode::HumanInLoop,
            autonomous_turn_limit: 0,
            return_to_previous_enabled: false,
            termination_condition: None,
        }
    }

    pub fn coordinator(mut self, coordinator_id: impl Into<String>) -> Self {
        self.coordinator_id = Some(coordinator_id.into());
        self
    }

    pub fn participants(mut self, participants: Participants) -> Self {
        self.participants = Some(participants);
        self
    }

    /// Declares `to` reachable via handoff from a reply produced while
    /// `from` is the active agent.
    pub fn allowed_handoff(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.allowed_handoffs.entry(from.into()).or_default().insert(to.into());
        self
    }

    pub fn human_in_loop(mut self) -> Self {
        self.mode = InteractionMode::HumanInLoop;
        self
    }

    pub fn autonomous(mut self, turn_limit: u32) -> Self {
        self.mode = InteractionMode::Autonomous;
        self.autonomous_turn_limit = turn_limit;
        self
    }

    pub fn with_return_to_previous(mut self, enabled: bool) -> Self {
        self.return_to_previous_enabled = enabled;
        self
    }

    pub fn with_termination_condition(mut self, condition: TerminationFn) -> Self {
        self.termination_condition = Some(condition);
        self
    }

    pub fn build(self) -> Result<HandoffCoordinator, HandoffError> {
        let coordinator_id = self.coordinator_id.ok_or(HandoffError::MissingCoordinator)?;
        let participants = self.participants.ok_or(HandoffError::MissingParticipants)?;
        if !participants.contains(&coordinator_id) {
            return Err(HandoffError::UnknownCoordinator(coordinator_id));
        }

        match self.mode {
            InteractionMode::Autonomous if self.autonomous_turn_limit == 0 => {
                return Err(HandoffError::InvalidAutonomousTurnLimit);
            }
            InteractionMode::HumanInLoop if self.autonomous_turn_limit > 0 => {
                warn!(turn_limit = self.autonomous_turn_limit, "autonomous_turn_limit set while in human_in_loop mode; ignored");
            }
            _ => {}
        }

        let termination_condition = self.termination_condition.unwrap_or_else(|| Arc::new(|_: &[ChatMessage]| false));

        Ok(HandoffCoordinator(Arc::new(Inner {
            id: self.id,
            coordinator_id,
            participants,
            allowed_handoffs: self.allowed_handoffs,
            mode: self.mode,
            autonomous_turn_limit: self.autonomous_turn_limit,
            return_to_previous_enabled: self.return_to_previous_enabled,
            termination_condition,
        })))
    }
}

/// A multi-agent conversation router. Register as the sole executor (or one
/// of several) in a [`workflow_core::WorkflowBuilder`]; drive it with
/// [`workflow_runtime::WorkflowRunner::start`]/`send_responses` using
/// [`HandoffTurn`] as the message payload.
pub struct HandoffCoordinator(Arc<Inner>);

impl Executor for HandoffCoordinator {
    fn id(&self) -> &str {
        &self.0.id
    }

    fn handlers(&self) -> Vec<HandlerEntry> {
        let inner = self.0.clone();
        vec![HandlerEntry {
            input_type_tag: type_tag::<HandoffTurn>(),
            handler: Arc::new(move |msg, ctx| {
                let inner = inner.clone();
                Box::pin(async move { run_turn(inner, msg, ctx).await })
            }),
        }]
    }
}

fn load_state(ctx: &dyn ExecutionContext, coordinator_id: &str) -> CoordinatorState {
    ctx.get_shared_state(STATE_KEY)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_else(|| CoordinatorState { current_agent_id: coordinator_id.to_string(), previous_agent_id: None, turns_in_autonomous: 0 })
}

fn load_conversation(ctx: &dyn ExecutionContext) -> Vec<ChatMessage> {
    ctx.get_shared_state(CONVERSATION_KEY).and_then(|v| serde_json::from_value(v).ok()).unwrap_or_default()
}

fn to_value_err<T: Serialize>(value: &T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::new(e.to_string()))
}

fn persist(ctx: &dyn ExecutionContext, state: &CoordinatorState, conversation: &[ChatMessage]) -> Result<(), HandlerError> {
    ctx.set_shared_state(STATE_KEY, to_value_err(state)?);
    ctx.set_shared_state(CONVERSATION_KEY, to_value_err(&conversation.to_vec())?);
    Ok(())
}

async fn run_turn(inner: Arc<Inner>, msg: Message, ctx: Arc<dyn ExecutionContext>) -> Result<(), HandlerError> {
    let turn: HandoffTurn = serde_json::from_value(msg.data).map_err(|e| HandlerError::new(e.to_string()))?;

    let mut state = load_state(ctx.as_ref(), &inner.coordinator_id);
    let mut conversation = load_conversation(ctx.as_ref());
    conversation.push(turn.message);

    loop {
        let agent_id = state.current_agent_id.clone();
        let agent = inner.participants.resolve(&agent_id).ok_or_else(|| HandlerError::new(format!("no participant registered for {agent_id:?}")))?;

        let mut scratch = AgentThread::new("scratch").map_err(|e| HandlerError::new(e.to_string()))?;
        let response = match agent.run(conversation.clone(), &mut scratch).await {
            Ok(response) => response,
            Err(err) => {
                // current_agent_id is left untouched so the caller can retry.
                persist(ctx.as_ref(), &state, &conversation)?;
                ctx.add_event(WorkflowEvent::error(Some(inner.id.clone()), ErrorKind::Handler, err.to_string()));
                return Err(HandlerError::new(err.to_string()));
            }
        };

        ctx.add_event(WorkflowEvent::AgentRunEvent { agent_id: agent_id.clone(), messages: to_value_err(&response.messages)?, is_streaming: false });
        conversation.extend(response.messages.clone());

        if (inner.termination_condition)(conversation.as_slice()) {
            persist(ctx.as_ref(), &state, &conversation)?;
            ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: to_value_err(&conversation)? });
            return Ok(());
        }

        let handoff_target = response.messages.last().and_then(|m| detect_handoff(m, &agent_id, &inner.allowed_handoffs));
        if let Some(target) = handoff_target {
            state.previous_agent_id = Some(agent_id);
            state.current_agent_id = target;
            state.turns_in_autonomous = 0;
            continue;
        }

        let next_agent_id = if inner.return_to_previous_enabled { agent_id } else { inner.coordinator_id.clone() };
        state.current_agent_id = next_agent_id.clone();

        match inner.mode {
            InteractionMode::HumanInLoop => {
                persist(ctx.as_ref(), &state, &conversation)?;
                let payload = to_value_err(&AwaitingInput { conversation: conversation.clone(), awaiting_agent_id: next_agent_id })?;
                ctx.request_info(type_tag::<HandoffTurn>(), payload).await;
                return Ok(());
            }
            InteractionMode::Autonomous => {
                state.turns_in_autonomous += 1;
                if state.turns_in_autonomous >= inner.autonomous_turn_limit {
                    persist(ctx.as_ref(), &state, &conversation)?;
                    ctx.add_event(WorkflowEvent::WorkflowOutputEvent { data: to_value_err(&conversation)? });
                    return Ok(());
                }
            }
        }
    }
}
