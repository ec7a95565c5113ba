//! In-memory [`WorkflowCheckpointSaver`], the default backend.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::{CheckpointId, Result, WorkflowCheckpoint, WorkflowCheckpointSaver};

/// Guarded in-memory map of `run_id -> Vec<WorkflowCheckpoint>`, newest last.
/// Suitable for tests and single-process deployments; a durable backend
/// (disk, database) plugs in via the same trait.
#[derive(Default)]
pub struct InMemoryCheckpointSaver {
    by_run: Mutex<HashMap<String, Vec<WorkflowCheckpoint>>>,
}

impl InMemoryCheckpointSaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowCheckpointSaver for InMemoryCheckpointSaver {
    async fn put(&self, run_id: &str, superstep: u64, payload: serde_json::Value) -> Result<CheckpointId> {
        let id = CheckpointId::new();
        let checkpoint = WorkflowCheckpoint {
            id: id.clone(),
            run_id: run_id.to_string(),
            superstep,
            payload,
        };
        self.by_run.lock().entry(run_id.to_string()).or_default().push(checkpoint);
        Ok(id)
    }

    async fn get(&self, id: &CheckpointId) -> Result<Option<WorkflowCheckpoint>> {
        Ok(self
            .by_run
            .lock()
            .values()
            .flatten()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn get_latest(&self, run_id: &str) -> Result<Option<WorkflowCheckpoint>> {
        Ok(self.by_run.lock().get(run_id).and_then(|v| v.last()).cloned())
    }

    async fn list(&self, run_id: &str) -> Result<Vec<WorkflowCheckpoint>> {
        Ok(self.by_run.lock().get(run_id).cloned().unwrap_or_default())
    }
}
