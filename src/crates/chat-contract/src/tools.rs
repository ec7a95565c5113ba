//! A mutable tool list shared across concurrent tool invocations within a
//! single model call.
//!
//! Tools may be appended mid-call (e.g. dynamic tool loading triggered by an
//! earlier tool result). Appends must not race, and every invocation must
//! observe a consistent prefix of the list as of the moment it reads it.
//! `SharedToolList` is an append-only `parking_lot`-guarded vector with a
//! sequence counter, following the guarded-shared-state idiom the teacher
//! uses for its websocket connection pools.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// A tool specification as exposed to a model call. Kept as an opaque JSON
/// value here — the concrete tool schema shape is a concern of whatever
/// `ChatClient` implementation consumes it.
pub type ToolSpec = Value;

#[derive(Default)]
struct Inner {
    tools: Vec<ToolSpec>,
    sequence: u64,
}

/// Cloneable handle to a shared, append-only tool list.
#[derive(Clone, Default)]
pub struct SharedToolList {
    inner: Arc<RwLock<Inner>>,
}

impl SharedToolList {
    pub fn new(initial: Vec<ToolSpec>) -> Self {
        let inner = Inner { tools: initial, sequence: 0 };
        Self { inner: Arc::new(RwLock::new(inner)) }
    }

    /// Append a tool, bumping the sequence counter. Safe to call
    /// concurrently from multiple tool invocations.
    pub fn append(&self, tool: ToolSpec) -> u64 {
        let mut inner = self.inner.write();
        inner.tools.push(tool);
        inner.sequence += 1;
        inner.sequence
    }

    /// Snapshot the tool list as of this call. A tool invocation that reads
    /// this at the start of its call is guaranteed to see every tool
    /// appended before that point, and no tool appended after it is
    /// silently missing from a later read.
    pub fn snapshot(&self) -> Vec<ToolSpec> {
        self.inner.read().tools.clone()
    }

    pub fn sequence(&self) -> u64 {
        self.inner.read().sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn concurrent_appends_are_all_observed() {
        let list = SharedToolList::new(vec![]);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let list = list.clone();
                thread::spawn(move || {
                    list.append(json!({ "name": format!("tool_{i}") }));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(list.snapshot().len(), 8);
        assert_eq!(list.sequence(), 8);
    }

    #[test]
    fn snapshot_is_a_consistent_prefix() {
        let list = SharedToolList::new(vec![json!({"name": "a"})]);
        let snap = list.snapshot();
        list.append(json!({"name": "b"}));
        assert_eq!(snap.len(), 1);
        assert_eq!(list.snapshot().len(), 2);
    }
}
