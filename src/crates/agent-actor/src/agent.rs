//! The `Agent` trait and its run/stream payload types (SPEC_FULL §4.5).
//! Grounded on `orchestrator::workflow::llm_executor::LlmWorkflowExecutor`'s
//! shape — a thin wrapper around one model call with a uniform
//! request/response contract — generalized from "execute one workflow step"
//! to "run one conversation turn", and from a concrete LLM client to any
//! `Agent` implementation.

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chat_contract::{AgentThread, ChatMessage, UsageDetails};

/// The full result of one `Agent::run` invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRunResponse {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageDetails>,
}

impl AgentRunResponse {
    pub fn text(role_text: impl Into<String>) -> Self {
        Self { messages: vec![ChatMessage::assistant(role_text)], usage: None }
    }
}

/// One incremental update from a streaming `Agent::run_stream` invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRunResponseUpdate {
    pub text: String,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent invocation failed: {0}")]
    Failed(String),
}

pub type UpdateStream = Pin<Box<dyn Stream<Item = AgentRunResponseUpdate> + Send>>;

/// Something that can carry on one turn of a conversation. `AgentActor`
/// hosts any implementor behind the actor runtime; `AgentProxy` implements
/// this same trait over a remote `ActorClient` so callers can't tell the
/// difference between a local and a proxied agent.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, messages: Vec<ChatMessage>, thread: &mut AgentThread) -> Result<AgentRunResponse, AgentError>;

    /// Streaming invocation. The default forwards `run`'s full reply as a
    /// single update; agents with genuine token-level streaming override
    /// this instead.
    async fn run_stream(&self, messages: Vec<ChatMessage>, thread: &mut AgentThread) -> Result<UpdateStream, AgentError> {
        let response = self.run(messages, thread).await?;
        let text = response.messages.iter().map(ChatMessage::text_content).collect::<Vec<_>>().join("");
        Ok(stream::once(async move { AgentRunResponseUpdate { text } }).boxed())
    }
}
