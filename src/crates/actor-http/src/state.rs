//! Shared application state for the HTTP surface (SPEC_FULL §6). Grounded on
//! `orchestrator::api::routes::AppState`'s plain shared-handle shape, swapping
//! its database connection and broadcast handle for an actor runtime and an
//! agent catalogue.

use std::collections::HashMap;
use std::sync::Arc;

use actor_runtime::ActorRuntime;
use agent_actor::Agent;
use parking_lot::RwLock;

/// A named, reusable way to build an [`Agent`] instance. The embedding
/// application registers kinds it knows how to construct (e.g. a particular
/// model/prompt combination); `/agents/register` binds an agent name to one
/// of these kinds rather than accepting arbitrary code over HTTP.
pub type AgentFactory = Arc<dyn Fn() -> Arc<dyn Agent> + Send + Sync>;

/// `kind -> factory` table, fixed at server construction.
#[derive(Clone, Default)]
pub struct AgentCatalogue {
    kinds: Arc<RwLock<HashMap<String, AgentFactory>>>,
}

impl AgentCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_kind(&self, kind: impl Into<String>, factory: AgentFactory) {
        self.kinds.write().insert(kind.into(), factory);
    }

    pub fn build(&self, kind: &str) -> Option<Arc<dyn Agent>> {
        self.kinds.read().get(kind).map(|factory| factory())
    }

    /// The factory itself, so a caller can mint a fresh agent per actor
    /// instance later without re-validating `kind` each time.
    pub fn factory_for(&self, kind: &str) -> Option<AgentFactory> {
        self.kinds.read().get(kind).cloned()
    }

    pub fn known_kinds(&self) -> Vec<String> {
        self.kinds.read().keys().cloned().collect()
    }
}

/// One entry in the `GET /agents` listing.
#[derive(Debug, Clone)]
pub struct RegisteredAgent {
    pub agent_name: String,
    pub kind: String,
}

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ActorRuntime>,
    pub catalogue: AgentCatalogue,
    registered: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    pub fn new(runtime: Arc<ActorRuntime>, catalogue: AgentCatalogue) -> Self {
        Self { runtime, catalogue, registered: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn is_registered(&self, agent_name: &str) -> bool {
        self.registered.read().contains_key(agent_name)
    }

    pub fn mark_registered(&self, agent_name: impl Into<String>, kind: impl Into<String>) {
        self.registered.write().insert(agent_name.into(), kind.into());
    }

    pub fn list_registered(&self) -> Vec<RegisteredAgent> {
        self.registered.read().iter().map(|(agent_name, kind)| RegisteredAgent { agent_name: agent_name.clone(), kind: kind.clone() }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_runtime::InMemoryStateStore;

    #[test]
    fn catalogue_builds_a_fresh_agent_per_call() {
        use agent_actor::{AgentError, AgentRunResponse};
        use async_trait::async_trait;
        use chat_contract::{AgentThread, ChatMessage};

        struct Noop;
        #[async_trait]
        impl Agent for Noop {
            async fn run(&self, _messages: Vec<ChatMessage>, _thread: &mut AgentThread) -> Result<AgentRunResponse, AgentError> {
                Ok(AgentRunResponse::text("noop"))
            }
        }

        let catalogue = AgentCatalogue::new();
        catalogue.register_kind("noop", Arc::new(|| Arc::new(Noop) as Arc<dyn Agent>));
        assert!(catalogue.build("noop").is_some());
        assert!(catalogue.build("missing").is_none());
    }

    #[test]
    fn app_state_tracks_registered_agents() {
        let runtime = Arc::new(ActorRuntime::new(Arc::new(InMemoryStateStore::new())));
        let state = AppState::new(runtime, AgentCatalogue::new());
        assert!(!state.is_registered("support"));
        state.mark_registered("support", "echo");
        assert!(state.is_registered("support"));
        assert_eq!(state.list_registered().len(), 1);
    }
}
