//! The workflow graph model: executors, typed messages, edge-routing
//! policies, shared state, and the event stream they emit. Owns SPEC_FULL
//! §3 (Data Model) and §4.1 (Workflow Graph Model); `workflow-runtime` turns
//! a [`Workflow`] into a running superstep loop.

pub mod builder;
pub mod edge;
pub mod edge_group;
pub mod error;
pub mod event;
pub mod executor;
pub mod message;
pub mod shared_state;
pub mod workflow;

pub use builder::{TerminationCondition, WorkflowBuilder};
pub use edge::{ConditionFn, Edge};
pub use edge_group::{Delivery, EdgeGroup, HandlerLookup, PartitionFn};
pub use error::{BuildError, BuildResult, RouteError, RouteResult};
pub use event::{ErrorKind, WorkflowEvent};
pub use executor::{
    BoxFuture, ExecutionContext, Executor, FnExecutor, HandlerEntry, HandlerError, HandlerFn, ResponseHandlerEntry, ResponseHandlerFn,
};
pub use message::{list_type_tag, type_tag, Message};
pub use shared_state::{SharedState, SharedStateSnapshot};
pub use workflow::{TerminationConditionFn, Workflow};
