//! `AgentActor`: hosts an [`Agent`] behind the actor runtime's `run`/
//! `run_stream` methods (SPEC_FULL §4.5). Grounded on
//! `orchestrator::workflow::llm_executor`'s request-handling flow — restore
//! context, invoke, persist, respond — generalized from a fixed LLM call to
//! any `Agent` implementation and from a one-shot result to the actor
//! runtime's progress-then-terminal response shape.

use std::sync::Arc;

use actor_runtime::{ActorContext, ActorError, ActorHandler, Result as ActorResult};
use async_trait::async_trait;
use chat_contract::{AgentThread, ChatMessage};
use futures::StreamExt;
use serde_json::Value;

use crate::agent::{Agent, AgentRunResponse};

const THREAD_STATE_KEY: &str = "agent_thread";

pub struct AgentActor {
    agent: Arc<dyn Agent>,
}

impl AgentActor {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    async fn restore_thread(&self, ctx: &ActorContext) -> ActorResult<AgentThread> {
        match ctx.read_state(THREAD_STATE_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(AgentThread::new(ctx.actor_id().instance_id.clone())?),
        }
    }

    fn parse_messages(params: &Value) -> ActorResult<Vec<ChatMessage>> {
        let raw = params.get("messages").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(raw)?)
    }

    async fn handle_run(&self, ctx: &ActorContext, params: Value) -> ActorResult<Value> {
        let messages = Self::parse_messages(&params)?;
        let mut thread = self.restore_thread(ctx).await?;
        thread.extend(messages.clone());

        let response = self.agent.run(messages, &mut thread).await.map_err(|e| ActorError::HandlerFailed(e.to_string()))?;

        ctx.write_state(THREAD_STATE_KEY, serde_json::to_value(&thread)?).await?;
        Ok(serde_json::to_value(&response)?)
    }

    async fn handle_run_stream(&self, ctx: &ActorContext, message_id: &str, params: Value) -> ActorResult<Value> {
        let messages = Self::parse_messages(&params)?;
        let mut thread = self.restore_thread(ctx).await?;
        thread.extend(messages.clone());
        let turn_start = thread.messages.len();

        let mut updates = self.agent.run_stream(messages, &mut thread).await.map_err(|e| ActorError::HandlerFailed(e.to_string()))?;
        while let Some(update) = updates.next().await {
            let progress = serde_json::to_value(&update)?;
            ctx.on_progress_update(message_id, serde_json::json!({ "progress": progress }));
        }

        ctx.write_state(THREAD_STATE_KEY, serde_json::to_value(&thread)?).await?;
        let response = AgentRunResponse { messages: thread.messages[turn_start..].to_vec(), usage: None };
        Ok(serde_json::to_value(&response)?)
    }
}

#[async_trait]
impl ActorHandler for AgentActor {
    async fn handle(&self, ctx: Arc<ActorContext>, message_id: String, method: String, params: Value) -> ActorResult<Value> {
        match method.as_str() {
            "run" => self.handle_run(&ctx, params).await,
            "run_stream" => self.handle_run_stream(&ctx, &message_id, params).await,
            other => Err(ActorError::HandlerFailed(format!("unsupported method {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_runtime::{ActorId, ActorResponseStatus, ActorRuntime, InMemoryStateStore};
    use chat_contract::Role;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn run(&self, messages: Vec<ChatMessage>, thread: &mut AgentThread) -> Result<AgentRunResponse, crate::agent::AgentError> {
            let last_user_text = messages.last().map(ChatMessage::text_content).unwrap_or_default();
            let reply = ChatMessage::assistant(format!("echo: {last_user_text}"));
            thread.push(reply.clone());
            Ok(AgentRunResponse { messages: vec![reply], usage: None })
        }
    }

    #[tokio::test]
    async fn run_persists_thread_and_completes_with_response() {
        let runtime = ActorRuntime::new(Arc::new(InMemoryStateStore::new()));
        runtime.registry().register("echo", Arc::new(|_id: &ActorId| Arc::new(AgentActor::new(Arc::new(Echo))) as Arc<dyn ActorHandler>));

        let id = ActorId::new("echo", "conv-1").unwrap();
        let params = serde_json::json!({ "messages": [ChatMessage::text(Role::User, "hi")] });
        let handle = runtime.send_request(id.clone(), "run", params).unwrap();
        let response = handle.get_response().await.unwrap();
        assert_eq!(response.status, ActorResponseStatus::Completed);

        let parsed: AgentRunResponse = serde_json::from_value(response.data.unwrap()).unwrap();
        assert_eq!(parsed.messages[0].text_content(), "echo: hi");

        let second_params = serde_json::json!({ "messages": [ChatMessage::text(Role::User, "again")] });
        let handle2 = runtime.send_request(id, "run", second_params).unwrap();
        let response2 = handle2.get_response().await.unwrap();
        let parsed2: AgentRunResponse = serde_json::from_value(response2.data.unwrap()).unwrap();
        assert_eq!(parsed2.messages[0].text_content(), "echo: again");
    }

    #[tokio::test]
    async fn run_stream_forwards_progress_and_completes() {
        let runtime = ActorRuntime::new(Arc::new(InMemoryStateStore::new()));
        runtime.registry().register("echo", Arc::new(|_id: &ActorId| Arc::new(AgentActor::new(Arc::new(Echo))) as Arc<dyn ActorHandler>));

        let id = ActorId::new("echo", "conv-1").unwrap();
        let params = serde_json::json!({ "messages": [ChatMessage::text(Role::User, "hi")] });
        let handle = runtime.send_request(id, "run_stream", params).unwrap();

        let items: Vec<_> = handle.watch_updates().collect::<Vec<_>>().await;
        assert!(items.len() >= 2, "expected at least one progress update and a terminal");
        assert!(matches!(items.last().unwrap(), actor_runtime::WatchItem::Terminal(_)));
    }
}
