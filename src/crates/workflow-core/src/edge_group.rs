//! The five edge-group routing policies (SPEC_FULL §4.1) and their delivery
//! algorithms.

use serde_json::Value;
use std::sync::Arc;

use crate::edge::Edge;
use crate::error::{RouteError, RouteResult};
use crate::message::Message;

/// `(data, numEdges) -> list<index>` for a [`EdgeGroup::Partitioning`] group.
pub type PartitionFn = Arc<dyn Fn(&Value, usize) -> Vec<usize> + Send + Sync>;

/// Anything that can answer "does executor X have a handler for this type
/// tag" — implemented by [`crate::Workflow`]. Kept as a trait so the routing
/// algorithms below don't need a concrete `Workflow` to be unit-tested.
pub trait HandlerLookup {
    fn can_handle(&self, target_id: &str, type_tag: &str) -> bool;
}

/// A policy over a set of edges sharing a structural role.
#[derive(Clone)]
pub enum EdgeGroup {
    /// One source -> one target, optionally conditional.
    Single(Edge),
    /// One source -> N targets (N >= 2); delivered to every edge that
    /// accepts the message.
    Source { source_id: String, edges: Vec<Edge> },
    /// N sources -> one aggregator target (N >= 2).
    Target { sources: Vec<String>, target_id: String },
    /// One source -> N targets with N-1 explicit conditions; the last edge
    /// is the unconditional default (else) branch.
    Conditional { source_id: String, edges: Vec<Edge>, default_target: String },
    /// One source -> N targets (N >= 2) selected by a partition function.
    Partitioning { source_id: String, targets: Vec<String>, partition_fn: PartitionFn },
}

/// The result of routing one message through one [`EdgeGroup`].
pub enum Delivery {
    /// Deliver these `(target_id, data)` pairs now, carrying the same type
    /// tag as the routed message.
    Immediate(Vec<(String, Value)>),
    /// Buffer `item` under `source_id` for the fan-in aggregator at
    /// `target_id`; the runner flushes once every declared source has
    /// contributed since the last flush (SPEC_FULL §4.1 Target algorithm).
    Aggregate { target_id: String, source_id: String, item: Value },
    /// Nothing in this group accepted the message.
    NoMatch,
}

impl EdgeGroup {
    /// Every executor whose emitted messages this group may route — a
    /// single emitter for every variant except `Target`, which listens for
    /// all of its declared fan-in sources.
    pub fn sources(&self) -> Vec<&str> {
        match self {
            EdgeGroup::Single(edge) => vec![&edge.source_id],
            EdgeGroup::Source { source_id, .. } => vec![source_id],
            EdgeGroup::Target { sources, .. } => sources.iter().map(String::as_str).collect(),
            EdgeGroup::Conditional { source_id, .. } => vec![source_id],
            EdgeGroup::Partitioning { source_id, .. } => vec![source_id],
        }
    }

    /// All ids this group might deliver to (for [`crate::Workflow`] validation).
    pub fn target_ids(&self) -> Vec<&str> {
        match self {
            EdgeGroup::Single(edge) => vec![&edge.target_id],
            EdgeGroup::Source { edges, .. } => edges.iter().map(|e| e.target_id.as_str()).collect(),
            EdgeGroup::Target { target_id, .. } => vec![target_id],
            EdgeGroup::Conditional { edges, default_target, .. } => {
                let mut ids: Vec<&str> = edges.iter().map(|e| e.target_id.as_str()).collect();
                ids.push(default_target);
                ids
            }
            EdgeGroup::Partitioning { targets, .. } => targets.iter().map(String::as_str).collect(),
        }
    }

    /// Whether this group routes *into* `executor_id` as a fan-in
    /// aggregator.
    pub fn is_fan_in_into(&self, executor_id: &str) -> bool {
        matches!(self, EdgeGroup::Target { target_id, .. } if target_id == executor_id)
    }

    /// Route `message` through this group.
    pub fn route(&self, lookup: &dyn HandlerLookup, message: &Message) -> RouteResult<Delivery> {
        match self {
            EdgeGroup::Single(edge) => route_single(edge, lookup, message),
            EdgeGroup::Source { edges, .. } => route_source(edges, lookup, message),
            EdgeGroup::Target { sources, target_id } => route_target(sources, target_id, message),
            EdgeGroup::Conditional { edges, default_target, .. } => route_conditional(edges, default_target, lookup, message),
            EdgeGroup::Partitioning { targets, partition_fn, .. } => route_partitioning(targets, partition_fn, lookup, message),
        }
    }
}

fn route_single(edge: &Edge, lookup: &dyn HandlerLookup, message: &Message) -> RouteResult<Delivery> {
    let target_eligible = message.target_id.as_deref().map_or(true, |t| t == edge.target_id);
    let accepts = target_eligible && lookup.can_handle(&edge.target_id, &message.type_tag) && edge.condition_passes(&message.data);
    if accepts {
        Ok(Delivery::Immediate(vec![(edge.target_id.clone(), message.data.clone())]))
    } else {
        Ok(Delivery::NoMatch)
    }
}

fn route_source(edges: &[Edge], lookup: &dyn HandlerLookup, message: &Message) -> RouteResult<Delivery> {
    let candidates = edges
        .iter()
        .filter(|e| message.target_id.as_deref().map_or(true, |t| t == e.target_id));

    let matched: Vec<(String, Value)> = candidates
        .filter(|e| lookup.can_handle(&e.target_id, &message.type_tag) && e.condition_passes(&message.data))
        .map(|e| (e.target_id.clone(), message.data.clone()))
        .collect();

    if matched.is_empty() {
        Err(RouteError::NoHandler { target: edges.iter().map(|e| e.target_id.clone()).collect::<Vec<_>>().join(","), type_tag: message.type_tag.clone() })
    } else {
        Ok(Delivery::Immediate(matched))
    }
}

fn route_target(sources: &[String], target_id: &str, message: &Message) -> RouteResult<Delivery> {
    if !sources.iter().any(|s| s == &message.source_id) {
        return Ok(Delivery::NoMatch);
    }
    Ok(Delivery::Aggregate {
        target_id: target_id.to_string(),
        source_id: message.source_id.clone(),
        item: message.data.clone(),
    })
}

fn route_conditional(edges: &[Edge], default_target: &str, lookup: &dyn HandlerLookup, message: &Message) -> RouteResult<Delivery> {
    let selected = edges
        .iter()
        .find(|e| e.condition_passes(&message.data))
        .map(|e| e.target_id.as_str())
        .unwrap_or(default_target);

    if let Some(explicit) = message.target_id.as_deref() {
        if explicit != selected {
            return Ok(Delivery::NoMatch);
        }
    }

    if lookup.can_handle(selected, &message.type_tag) {
        Ok(Delivery::Immediate(vec![(selected.to_string(), message.data.clone())]))
    } else {
        Err(RouteError::NoHandler { target: selected.to_string(), type_tag: message.type_tag.clone() })
    }
}

fn route_partitioning(targets: &[String], partition_fn: &PartitionFn, lookup: &dyn HandlerLookup, message: &Message) -> RouteResult<Delivery> {
    let indices = partition_fn(&message.data, targets.len());
    for &idx in &indices {
        if idx >= targets.len() {
            return Err(RouteError::InvalidPartitionIndex { index: idx, count: targets.len() });
        }
    }
    let delivered: Vec<(String, Value)> = indices
        .into_iter()
        .map(|idx| &targets[idx])
        .filter(|target| lookup.can_handle(target, &message.type_tag))
        .map(|target| (target.clone(), message.data.clone()))
        .collect();
    Ok(Delivery::Immediate(delivered))
}
