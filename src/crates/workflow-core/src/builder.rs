//! Fluent assembly of a [`Workflow`], enforcing every SPEC_FULL §4.1/§8
//! structural invariant eagerly at `build()` time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::edge::{ConditionFn, Edge};
use crate::edge_group::{EdgeGroup, PartitionFn};
use crate::error::{BuildError, BuildResult};
use crate::executor::Executor;
use crate::workflow::{TerminationConditionFn, Workflow};

pub type TerminationCondition = TerminationConditionFn;

pub struct WorkflowBuilder {
    start_id: Option<String>,
    executors: HashMap<String, Arc<dyn Executor>>,
    edge_groups: Vec<EdgeGroup>,
    checkpointing_enabled: bool,
    termination_condition: Option<TerminationCondition>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            start_id: None,
            executors: HashMap::new(),
            edge_groups: Vec::new(),
            checkpointing_enabled: false,
            termination_condition: None,
        }
    }

    /// Register an executor. Also designates it as the start executor if
    /// none has been set yet — callers that need an explicit start with
    /// multiple executors should call [`Self::set_start_executor`] after.
    pub fn add_executor(mut self, executor: Arc<dyn Executor>) -> BuildResult<Self> {
        let id = executor.id().to_string();
        if self.executors.contains_key(&id) {
            return Err(BuildError::DuplicateExecutor(id));
        }
        if self.start_id.is_none() {
            self.start_id = Some(id.clone());
        }
        self.executors.insert(id, executor);
        Ok(self)
    }

    pub fn set_start_executor(mut self, id: impl Into<String>) -> Self {
        self.start_id = Some(id.into());
        self
    }

    pub fn add_edge(mut self, source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        self.edge_groups.push(EdgeGroup::Single(Edge::new(source_id, target_id)));
        self
    }

    pub fn add_conditional_edge(mut self, source_id: impl Into<String>, target_id: impl Into<String>, condition: ConditionFn) -> Self {
        self.edge_groups.push(EdgeGroup::Single(Edge::new(source_id, target_id).with_condition(condition)));
        self
    }

    pub fn add_fan_out_edges(mut self, source_id: impl Into<String>, target_ids: Vec<String>) -> Self {
        let source_id = source_id.into();
        let edges = target_ids.into_iter().map(|t| Edge::new(source_id.clone(), t)).collect();
        self.edge_groups.push(EdgeGroup::Source { source_id, edges });
        self
    }

    pub fn add_fan_in_edges(mut self, source_ids: Vec<String>, target_id: impl Into<String>) -> Self {
        self.edge_groups.push(EdgeGroup::Target { sources: source_ids, target_id: target_id.into() });
        self
    }

    /// `branches` is the ordered list of `(target_id, condition)` pairs
    /// evaluated before falling back to `default_target`.
    pub fn add_conditional_edges(
        mut self,
        source_id: impl Into<String>,
        branches: Vec<(String, ConditionFn)>,
        default_target: impl Into<String>,
    ) -> Self {
        let source_id = source_id.into();
        let edges = branches
            .into_iter()
            .map(|(target, cond)| Edge::new(source_id.clone(), target).with_condition(cond))
            .collect();
        self.edge_groups.push(EdgeGroup::Conditional { source_id, edges, default_target: default_target.into() });
        self
    }

    pub fn add_partitioning_edges(mut self, source_id: impl Into<String>, target_ids: Vec<String>, partition_fn: PartitionFn) -> Self {
        self.edge_groups.push(EdgeGroup::Partitioning { source_id: source_id.into(), targets: target_ids, partition_fn });
        self
    }

    pub fn with_checkpointing(mut self, enabled: bool) -> Self {
        self.checkpointing_enabled = enabled;
        self
    }

    pub fn with_termination_condition(mut self, condition: TerminationCondition) -> Self {
        self.termination_condition = Some(condition);
        self
    }

    pub fn build(self) -> BuildResult<Workflow> {
        let start_id = self.start_id.clone().ok_or_else(|| BuildError::UnknownStartExecutor(String::new()))?;
        if !self.executors.contains_key(&start_id) {
            return Err(BuildError::UnknownStartExecutor(start_id));
        }

        for group in &self.edge_groups {
            for source in group.sources() {
                if !self.executors.contains_key(source) {
                    return Err(BuildError::UnknownExecutor(source.to_string()));
                }
            }
            for target in group.target_ids() {
                if !self.executors.contains_key(target) {
                    return Err(BuildError::UnknownExecutor(target.to_string()));
                }
            }

            match group {
                EdgeGroup::Source { source_id, edges } if edges.len() < 2 => {
                    return Err(BuildError::FanOutTooFewTargets { source: source_id.clone(), count: edges.len() });
                }
                EdgeGroup::Target { sources, target_id } if sources.len() < 2 => {
                    return Err(BuildError::FanInTooFewSources { target: target_id.clone(), count: sources.len() });
                }
                EdgeGroup::Conditional { source_id, edges, .. } if edges.is_empty() => {
                    return Err(BuildError::ConditionalArityMismatch { source: source_id.clone() });
                }
                EdgeGroup::Partitioning { source_id, targets, .. } if targets.len() < 2 => {
                    return Err(BuildError::PartitioningTooFewTargets { source: source_id.clone(), count: targets.len() });
                }
                _ => {}
            }
        }

        let mut handlers = HashMap::new();
        let mut response_handlers = HashMap::new();
        for (id, executor) in &self.executors {
            handlers.insert(id.clone(), executor.handlers());

            let entries = executor.response_handlers();
            let mut seen: HashSet<(String, String)> = HashSet::new();
            for entry in &entries {
                let key = (entry.request_type_tag.clone(), entry.response_type_tag.clone());
                if !seen.insert(key) {
                    return Err(BuildError::DuplicateResponseHandler {
                        executor: id.clone(),
                        request_type: entry.request_type_tag.clone(),
                        response_type: entry.response_type_tag.clone(),
                    });
                }
            }
            response_handlers.insert(id.clone(), entries);
        }

        Ok(Workflow {
            start_id,
            executors: self.executors,
            handlers,
            response_handlers,
            edge_groups: self.edge_groups,
            checkpointing_enabled: self.checkpointing_enabled,
            termination_condition: self.termination_condition,
        })
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
