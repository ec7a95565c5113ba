//! Agent thread state: an ordered chat log plus a validated id.
//!
//! A thread is fully reconstructible from `{ id, messages }` — no hidden
//! state lives outside this struct, so `restore(save(thread)) == thread`
//! trivially (see the round-trip test below), which is the property the
//! actor runtime's state-store persistence relies on.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::validation::{validate_id, InvalidId};

/// Ordered chat log for one conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentThread {
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

impl AgentThread {
    /// Create an empty thread, validating `id` against the shared id
    /// pattern (`^[a-zA-Z0-9_.\-~]+$`).
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidId> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self { id, messages: Vec::new() })
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(messages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_id() {
        assert!(AgentThread::new("bad id").is_err());
    }

    #[test]
    fn serialize_then_deserialize_round_trips() {
        let mut thread = AgentThread::new("conv-1").unwrap();
        thread.push(ChatMessage::user("hi"));
        thread.push(ChatMessage::assistant("hello"));

        let json = serde_json::to_string(&thread).unwrap();
        let restored: AgentThread = serde_json::from_str(&json).unwrap();
        assert_eq!(thread, restored);
    }
}
