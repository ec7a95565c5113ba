//! Checkpoint persistence for the workflow runner.
//!
//! Generalizes the teacher's per-channel graph checkpoint
//! (`langgraph_checkpoint::CheckpointSaver`) to the workflow runner's
//! per-superstep snapshot: `{ supersteps, message_queue, shared_state,
//! per_executor_metadata, pending_requests }` (SPEC_FULL §4.2). The payload
//! shape itself is owned by `workflow-runtime`; this crate only defines the
//! storage trait and an opaque, serializable envelope around it, so it has
//! no dependency on `workflow-core`/`workflow-runtime` types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;
pub use memory::InMemoryCheckpointSaver;

/// Opaque checkpoint identifier returned to callers, per SPEC_FULL §4.2
/// ("Checkpoint identifiers are opaque strings").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckpointId(pub String);

impl CheckpointId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl Default for CheckpointId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single persisted snapshot of a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCheckpoint {
    pub id: CheckpointId,
    pub run_id: String,
    pub superstep: u64,
    /// The runner-defined snapshot payload, kept as an opaque JSON value so
    /// this crate does not depend on `workflow-runtime`'s types.
    pub payload: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint {0} not found")]
    NotFound(CheckpointId),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("checkpoint backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Storage backend for workflow checkpoints. Implementations must persist
/// and restore the exact `payload` bytes given to [`WorkflowCheckpointSaver::put`] —
/// the runner is responsible for giving that payload the semantics described
/// in SPEC_FULL §4.2.
#[async_trait]
pub trait WorkflowCheckpointSaver: Send + Sync {
    /// Persist a new checkpoint for `run_id` at the given superstep,
    /// returning its opaque id.
    async fn put(&self, run_id: &str, superstep: u64, payload: serde_json::Value) -> Result<CheckpointId>;

    /// Fetch a checkpoint by id.
    async fn get(&self, id: &CheckpointId) -> Result<Option<WorkflowCheckpoint>>;

    /// Fetch the most recently persisted checkpoint for a run, if any.
    async fn get_latest(&self, run_id: &str) -> Result<Option<WorkflowCheckpoint>>;

    /// List all checkpoints for a run, oldest first.
    async fn list(&self, run_id: &str) -> Result<Vec<WorkflowCheckpoint>>;
}
