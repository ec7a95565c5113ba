//! `AgentProxy`: presents the same `run`/`run_stream` surface as a local
//! [`Agent`] but dispatches through an [`ActorClient`] (SPEC_FULL §4.5).
//! Grounded on `orchestrator::client::client::AcoClient`'s
//! send-then-await-response shape, narrowed from a WebSocket round trip to
//! an in-process `ActorClient` call.

use std::pin::Pin;
use std::sync::Arc;

use actor_runtime::{ActorClient, ActorId, ActorResponseStatus, WatchItem};
use chat_contract::validation::{validate_id, InvalidId};
use chat_contract::ChatMessage;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::agent::{AgentRunResponse, AgentRunResponseUpdate};

/// A thread handle owned by one [`AgentProxy`]. Carries the owning agent's
/// name so a thread minted by one proxy can't silently be replayed against
/// another agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyThread {
    pub id: String,
    agent_name: String,
}

impl ProxyThread {
    fn new(agent_name: &str) -> Self {
        Self { id: Uuid::new_v4().to_string(), agent_name: agent_name.to_string() }
    }

    pub fn with_id(agent_name: impl Into<String>, id: impl Into<String>) -> Result<Self, InvalidId> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self { id, agent_name: agent_name.into() })
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("actor request error: {0}")]
    Transport(#[from] actor_runtime::ActorError),
    #[error("agent {agent_name} failed: {message} (kind={kind})")]
    AgentFailed { agent_name: String, message: String, kind: String },
    #[error("thread {thread_id} does not belong to agent {agent_name}")]
    WrongProxyThread { agent_name: String, thread_id: String },
    #[error("protocol violation: actor returned status {0:?} after await")]
    ProtocolViolation(ActorResponseStatus),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid thread id: {0}")]
    InvalidThreadId(#[from] InvalidId),
}

/// Mirrors [`Agent`](crate::agent::Agent)'s `run`/`run_stream` surface over
/// an `ActorClient`, so callers can't tell a proxied agent from a local one.
pub struct AgentProxy {
    client: Arc<dyn ActorClient>,
    agent_name: String,
}

impl AgentProxy {
    pub fn new(client: Arc<dyn ActorClient>, agent_name: impl Into<String>) -> Self {
        Self { client, agent_name: agent_name.into() }
    }

    /// Mint a fresh thread owned by this proxy's agent.
    pub fn new_thread(&self) -> ProxyThread {
        ProxyThread::new(&self.agent_name)
    }

    fn actor_id_for(&self, thread: &ProxyThread) -> Result<ActorId, ProxyError> {
        if thread.agent_name != self.agent_name {
            return Err(ProxyError::WrongProxyThread { agent_name: self.agent_name.clone(), thread_id: thread.id.clone() });
        }
        Ok(ActorId::new(self.agent_name.clone(), thread.id.clone())?)
    }

    fn resolve_thread(&self, thread: Option<&ProxyThread>) -> Result<(ProxyThread, ActorId), ProxyError> {
        let owned = match thread {
            Some(t) => t.clone(),
            None => self.new_thread(),
        };
        let actor_id = self.actor_id_for(&owned)?;
        Ok((owned, actor_id))
    }

    pub async fn run(&self, messages: Vec<ChatMessage>, thread: Option<&ProxyThread>) -> Result<AgentRunResponse, ProxyError> {
        let (_thread, actor_id) = self.resolve_thread(thread)?;
        let params = json!({ "messages": messages });
        let handle = self.client.send_request(actor_id, "run".to_string(), params, Uuid::new_v4().to_string()).await?;
        let response = handle.get_response().await?;

        match response.status {
            ActorResponseStatus::Completed => Ok(serde_json::from_value(response.data.unwrap_or(Value::Null))?),
            ActorResponseStatus::Failed => {
                let data = response.data.unwrap_or_else(|| json!({}));
                Err(ProxyError::AgentFailed {
                    agent_name: self.agent_name.clone(),
                    message: data["message"].as_str().unwrap_or_default().to_string(),
                    kind: data["kind"].as_str().unwrap_or_default().to_string(),
                })
            }
            other => Err(ProxyError::ProtocolViolation(other)),
        }
    }

    /// Streams progress updates, yielding an `Err` if the underlying
    /// request ultimately fails. Ends silently on a `Completed` terminal —
    /// callers that need the final aggregated response should call `run`
    /// separately, or accumulate update text themselves.
    pub async fn run_stream(&self, messages: Vec<ChatMessage>, thread: Option<&ProxyThread>) -> Result<Pin<Box<dyn Stream<Item = Result<AgentRunResponseUpdate, ProxyError>> + Send>>, ProxyError> {
        let (_thread, actor_id) = self.resolve_thread(thread)?;
        let params = json!({ "messages": messages });
        let handle = self.client.send_request(actor_id, "run_stream".to_string(), params, Uuid::new_v4().to_string()).await?;
        let agent_name = self.agent_name.clone();

        let stream = async_stream::stream! {
            let mut updates = handle.watch_updates();
            while let Some(item) = updates.next().await {
                match item {
                    WatchItem::Progress(update) => {
                        if let Some(progress_value) = update.data.get("progress").cloned() {
                            match serde_json::from_value::<AgentRunResponseUpdate>(progress_value) {
                                Ok(parsed) => yield Ok(parsed),
                                Err(e) => yield Err(ProxyError::Serialization(e)),
                            }
                        }
                    }
                    WatchItem::Terminal(response) => {
                        if response.status == ActorResponseStatus::Failed {
                            let data = response.data.unwrap_or_else(|| json!({}));
                            yield Err(ProxyError::AgentFailed {
                                agent_name: agent_name.clone(),
                                message: data["message"].as_str().unwrap_or_default().to_string(),
                                kind: data["kind"].as_str().unwrap_or_default().to_string(),
                            });
                        }
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::agent_actor::AgentActor;
    use actor_runtime::{ActorHandler, ActorRuntime, InMemoryStateStore};
    use async_trait::async_trait;
    use chat_contract::{AgentThread, Role};

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn run(&self, messages: Vec<ChatMessage>, thread: &mut AgentThread) -> Result<AgentRunResponse, crate::agent::AgentError> {
            let last = messages.last().map(ChatMessage::text_content).unwrap_or_default();
            let reply = ChatMessage::assistant(format!("echo: {last}"));
            thread.push(reply.clone());
            Ok(AgentRunResponse { messages: vec![reply], usage: None })
        }
    }

    fn runtime_with_echo() -> Arc<ActorRuntime> {
        let runtime = Arc::new(ActorRuntime::new(Arc::new(InMemoryStateStore::new())));
        runtime.registry().register("echo", Arc::new(|_id: &ActorId| Arc::new(AgentActor::new(Arc::new(Echo))) as Arc<dyn ActorHandler>));
        runtime
    }

    #[tokio::test]
    async fn run_deserializes_the_agents_response() {
        let runtime = runtime_with_echo();
        let proxy = AgentProxy::new(runtime, "echo");
        let thread = proxy.new_thread();

        let response = proxy.run(vec![ChatMessage::text(Role::User, "hi")], Some(&thread)).await.unwrap();
        assert_eq!(response.messages[0].text_content(), "echo: hi");
    }

    #[tokio::test]
    async fn wrong_proxy_thread_is_rejected_before_dispatch() {
        let runtime = runtime_with_echo();
        let proxy = AgentProxy::new(runtime, "echo");
        let foreign_thread = ProxyThread::with_id("someone_else", "conv-1").unwrap();

        let result = proxy.run(vec![ChatMessage::text(Role::User, "hi")], Some(&foreign_thread)).await;
        assert!(matches!(result, Err(ProxyError::WrongProxyThread { .. })));
    }
}
