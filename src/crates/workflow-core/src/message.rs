//! Message envelopes and the runtime type-tag dispatch mechanism.
//!
//! The source's handler registries dispatch on the runtime type of the
//! payload a message carries — something Rust cannot do via reflection.
//! Instead, every message carries an explicit `type_tag: String` computed
//! once, at construction, from the Rust type of its data (SPEC_FULL §9,
//! "runtime type dispatch on message and content variants"). Handlers
//! register against the tag of their declared input type; fan-in groups
//! synthesize their own `"list<{T}>"` tag.

use serde::Serialize;
use serde_json::Value;

/// Computes the dispatch tag for `T`. Two distinct Rust types will not
/// collide under this unless a caller composes conflicting type aliases —
/// in that case the collision is exactly what the source language's runtime
/// type check would also conflate under a shared alias.
pub fn type_tag<T: 'static>() -> String {
    std::any::type_name::<T>().to_string()
}

/// The tag a fan-in (`Target`) edge group's aggregator handler must be
/// registered under to accept the aggregated `list<T>`.
pub fn list_type_tag<T: 'static>() -> String {
    format!("list<{}>", type_tag::<T>())
}

/// A message passed between executors.
///
/// `target_id` absent means "broadcast to all eligible edges from source"
/// (SPEC_FULL §3). `data` is kept as a [`Value`] because handlers are
/// discovered dynamically by tag rather than by static generic parameter —
/// callers reconstruct the concrete type with `serde_json::from_value`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub data: Value,
    pub type_tag: String,
    pub source_id: String,
    pub target_id: Option<String>,
    pub trace_context: Option<Value>,
}

impl Message {
    /// Build a message from a concrete, serializable payload, computing its
    /// type tag from `T`.
    pub fn new<T: Serialize + 'static>(source_id: impl Into<String>, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            type_tag: type_tag::<T>(),
            source_id: source_id.into(),
            target_id: None,
            trace_context: None,
        })
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_trace_context(mut self, trace_context: Value) -> Self {
        self.trace_context = Some(trace_context);
        self
    }

    /// Construct an aggregated fan-in message from already-tagged items.
    /// `item_type_tag` is the tag of the element type `T`, and the
    /// resulting message's tag is `list<T>`.
    pub fn aggregated(source_id: impl Into<String>, item_type_tag: &str, items: Vec<Value>) -> Self {
        Self {
            data: Value::Array(items),
            type_tag: format!("list<{item_type_tag}>"),
            source_id: source_id.into(),
            target_id: None,
            trace_context: None,
        }
    }
}
