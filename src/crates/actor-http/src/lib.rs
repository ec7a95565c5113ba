//! Minimal HTTP surface over the actor runtime and agent actors (SPEC_FULL
//! §6): `POST /agents/{agent_name}/run`, `POST /agents/register`,
//! `GET /agents`, `GET /health`, plus a word-chunking streaming simulation.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod streaming;

pub use error::{ApiError, ApiErrorBody};
pub use routes::create_router;
pub use state::{AgentCatalogue, AgentFactory, AppState, RegisteredAgent};
pub use streaming::StreamFormat;
