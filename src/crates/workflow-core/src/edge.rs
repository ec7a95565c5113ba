//! A single directed connection between two executors.

use serde_json::Value;
use std::sync::Arc;

pub type ConditionFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// `{ sourceId, targetId, condition? }` from SPEC_FULL §3.
#[derive(Clone)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub condition: Option<ConditionFn>,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self { source_id: source_id.into(), target_id: target_id.into(), condition: None }
    }

    pub fn with_condition(mut self, condition: ConditionFn) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Evaluate this edge's condition against `data`, if any. An edge with
    /// no condition always passes.
    pub fn condition_passes(&self, data: &Value) -> bool {
        self.condition.as_ref().map_or(true, |c| c(data))
    }
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edge")
            .field("source_id", &self.source_id)
            .field("target_id", &self.target_id)
            .field("condition", &self.condition.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
