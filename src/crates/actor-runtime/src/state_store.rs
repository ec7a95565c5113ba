//! Pluggable per-actor state persistence (SPEC_FULL §4.4).
//!
//! Narrowed from the teacher's per-entity SQL repository idiom
//! (`orchestrator::db::repositories::*`) down to the single trait seam this
//! runtime actually needs: read/write/delete one JSON value per
//! `(actor_id, key)`. No SQL-backed implementation is built — persistence
//! beyond this seam is out of scope.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::actor_id::ActorId;
use crate::error::Result;

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn read_state(&self, actor_id: &ActorId, key: &str) -> Result<Option<Value>>;
    /// Writes are atomic per `(actor_id, key)` — no interleaving with a
    /// concurrent write to the same key is observable.
    async fn write_state(&self, actor_id: &ActorId, key: &str, value: Value) -> Result<()>;
    async fn delete_state(&self, actor_id: &ActorId, key: &str) -> Result<()>;
}

/// In-memory default, keyed by `(type_name, instance_id, key)`.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: DashMap<(String, String, String), Value>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn compound_key(actor_id: &ActorId, key: &str) -> (String, String, String) {
        (actor_id.type_name.clone(), actor_id.instance_id.clone(), key.to_string())
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn read_state(&self, actor_id: &ActorId, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(&Self::compound_key(actor_id, key)).map(|v| v.clone()))
    }

    async fn write_state(&self, actor_id: &ActorId, key: &str, value: Value) -> Result<()> {
        self.entries.insert(Self::compound_key(actor_id, key), value);
        Ok(())
    }

    async fn delete_state(&self, actor_id: &ActorId, key: &str) -> Result<()> {
        self.entries.remove(&Self::compound_key(actor_id, key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = InMemoryStateStore::new();
        let id = ActorId::new("agent", "conv-1").unwrap();
        store.write_state(&id, "thread", serde_json::json!({"messages": []})).await.unwrap();
        let read = store.read_state(&id, "thread").await.unwrap();
        assert_eq!(read, Some(serde_json::json!({"messages": []})));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = InMemoryStateStore::new();
        let id = ActorId::new("agent", "conv-1").unwrap();
        store.write_state(&id, "thread", serde_json::json!(1)).await.unwrap();
        store.delete_state(&id, "thread").await.unwrap();
        assert_eq!(store.read_state(&id, "thread").await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_scoped_per_actor() {
        let store = InMemoryStateStore::new();
        let a = ActorId::new("agent", "a").unwrap();
        let b = ActorId::new("agent", "b").unwrap();
        store.write_state(&a, "thread", serde_json::json!("a")).await.unwrap();
        store.write_state(&b, "thread", serde_json::json!("b")).await.unwrap();
        assert_eq!(store.read_state(&a, "thread").await.unwrap(), Some(serde_json::json!("a")));
        assert_eq!(store.read_state(&b, "thread").await.unwrap(), Some(serde_json::json!("b")));
    }
}
