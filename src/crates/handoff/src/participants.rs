//! Participant registry for the handoff coordinator (SPEC_FULL §4.6).
//!
//! A participant set is provided wholesale as either live instances or
//! factories, never a mix — the enum shape makes mixing structurally
//! impossible rather than a rule enforced after the fact.

use std::collections::HashMap;
use std::sync::Arc;

use agent_actor::Agent;

/// Produces a participant agent for `participant_id` on first use.
pub type ParticipantFactory = Arc<dyn Fn(&str) -> Arc<dyn Agent> + Send + Sync>;

/// Either a fixed map of agent instances, or factories invoked once per
/// dispatch to a given participant id.
pub enum Participants {
    Instances(HashMap<String, Arc<dyn Agent>>),
    Factories(HashMap<String, ParticipantFactory>),
}

impl Participants {
    pub fn instances(map: HashMap<String, Arc<dyn Agent>>) -> Self {
        Participants::Instances(map)
    }

    pub fn factories(map: HashMap<String, ParticipantFactory>) -> Self {
        Participants::Factories(map)
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            Participants::Instances(map) => map.contains_key(id),
            Participants::Factories(map) => map.contains_key(id),
        }
    }

    /// Resolve `id` to a live agent. A factory that panics or is absent
    /// surfaces as `None` here — dispatch treats a missing participant as
    /// fatal (SPEC_FULL §4.6 "a missing specialist is fatal").
    pub fn resolve(&self, id: &str) -> Option<Arc<dyn Agent>> {
        match self {
            Participants::Instances(map) => map.get(id).cloned(),
            Participants::Factories(map) => map.get(id).map(|f| f(id)),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        match self {
            Participants::Instances(map) => map.keys().cloned().collect(),
            Participants::Factories(map) => map.keys().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn instances_resolve_by_id() {
        let mut map: HashMap<String, Arc<dyn Agent>> = HashMap::new();
        map.insert("a".to_string(), Arc::new(Noop));
        let participants = Participants::instances(map);
        assert!(participants.resolve("a").is_some());
        assert!(participants.resolve("b").is_none());
    }

    #[test]
    fn factories_are_invoked_per_resolve() {
        let mut map: HashMap<String, ParticipantFactory> = HashMap::new();
        map.insert("a".to_string(), Arc::new(|_id: &str| Arc::new(Noop) as Arc<dyn Agent>));
        let participants = Participants::factories(map);
        assert!(participants.resolve("a").is_some());
        assert!(participants.contains("a"));
        assert!(!participants.contains("ghost"));
    }
}
