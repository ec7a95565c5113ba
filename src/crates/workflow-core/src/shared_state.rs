//! Process-wide, run-scoped key-value state (SPEC_FULL §3).
//!
//! Writes made by a handler in superstep *k* become visible to handlers in
//! superstep *k+1*; within one superstep, reads observe the value as of the
//! step's start. `workflow-runtime` enforces the superstep-boundary
//! visibility rule by swapping in a fresh read-snapshot per superstep; this
//! type itself is just the guarded map plus snapshotting support.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SharedStateSnapshot(pub HashMap<String, Value>);

/// Cloneable handle to a run's shared state.
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SharedStateSnapshot) -> Self {
        Self { inner: Arc::new(RwLock::new(snapshot.0)) }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.write().insert(key.into(), value);
    }

    /// Snapshot the current state for checkpointing, matching
    /// SPEC_FULL §4.2's checkpoint payload requirement that shared state be
    /// snapshot-serializable.
    pub fn snapshot(&self) -> SharedStateSnapshot {
        SharedStateSnapshot(self.inner.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let state = SharedState::new();
        state.set("k", Value::from(42));
        assert_eq!(state.get("k"), Some(Value::from(42)));
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let state = SharedState::new();
        state.set("k", Value::from("v"));
        let snapshot = state.snapshot();
        let restored = SharedState::from_snapshot(snapshot);
        assert_eq!(restored.get("k"), Some(Value::from("v")));
    }
}
