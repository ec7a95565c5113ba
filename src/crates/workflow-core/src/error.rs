//! Error types for graph construction and routing.
//!
//! Mirrors the teacher's `langgraph_core::error::GraphError` split between
//! configuration-time errors (raised eagerly, see SPEC_FULL §7) and
//! routing/dispatch errors (surfaced as events by the runner, not by this
//! crate — `workflow-core` only reports what it can detect statically or
//! while computing a single edge group's routing decision).

use thiserror::Error;

/// Errors raised while building a [`crate::Workflow`] — all of these are
/// configuration errors per SPEC_FULL §7 and are meant to be raised eagerly
/// at `build()` time, never mid-run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("start executor {0:?} is not registered")]
    UnknownStartExecutor(String),

    #[error("edge references unknown executor {0:?}")]
    UnknownExecutor(String),

    #[error("duplicate response handler key ({request_type:?}, {response_type:?}) on executor {executor:?}")]
    DuplicateResponseHandler {
        executor: String,
        request_type: String,
        response_type: String,
    },

    #[error("fan-out group from {source:?} needs at least two targets, got {count}")]
    FanOutTooFewTargets { source: String, count: usize },

    #[error("fan-in group into {target:?} needs at least two sources, got {count}")]
    FanInTooFewSources { target: String, count: usize },

    #[error("conditional group from {source:?} needs len(targets) == len(conditions) + 1")]
    ConditionalArityMismatch { source: String },

    #[error("partitioning group from {source:?} needs at least two targets, got {count}")]
    PartitioningTooFewTargets { source: String, count: usize },

    #[error("executor id {0:?} registered more than once")]
    DuplicateExecutor(String),
}

/// Errors raised while routing a single message through one [`crate::EdgeGroup`].
/// Fatal variants (per SPEC_FULL §4.2/§7) should cause the run to abort;
/// `NoHandler` is non-fatal and is surfaced as an `ErrorEvent` while the run
/// continues — that policy decision lives in `workflow-runtime`, which
/// matches on these variants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no handler on {target:?} accepts message type {type_tag:?}")]
    NoHandler { target: String, type_tag: String },

    #[error("partition function returned out-of-range index {index} for {count} targets")]
    InvalidPartitionIndex { index: usize, count: usize },

    #[error("message serialization error: {0}")]
    Serialization(String),
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type RouteResult<T> = std::result::Result<T, RouteError>;
