//! `ActorId`: a `(type_name, instance_id)` pair addressing one actor
//! instance (SPEC_FULL §3). `instance_id` shares the thread-id validation
//! pattern from `chat-contract`.

use chat_contract::validation::{validate_id, InvalidId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    pub type_name: String,
    pub instance_id: String,
}

impl ActorId {
    pub fn new(type_name: impl Into<String>, instance_id: impl Into<String>) -> Result<Self, InvalidId> {
        let instance_id = instance_id.into();
        validate_id(&instance_id)?;
        Ok(Self { type_name: type_name.into(), instance_id })
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_name, self.instance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_instance_id() {
        assert!(ActorId::new("agent", "bad id").is_err());
    }

    #[test]
    fn displays_as_type_slash_instance() {
        let id = ActorId::new("agent", "conv-1").unwrap();
        assert_eq!(id.to_string(), "agent/conv-1");
    }
}
