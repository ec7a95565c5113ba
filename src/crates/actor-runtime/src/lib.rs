pub mod actor_id;
pub mod context;
pub mod error;
pub mod handle;
pub mod registry;
pub mod runtime;
pub mod state_store;
mod table;

pub use actor_id::ActorId;
pub use context::ActorContext;
pub use error::{ActorError, Result};
pub use handle::{ActorResponse, ActorResponseHandle, ActorResponseStatus, ProgressUpdate, WatchItem};
pub use registry::{ActorFactory, ActorHandler, ActorRegistry};
pub use runtime::{ActorClient, ActorRuntime};
pub use state_store::{InMemoryStateStore, StateStore};
