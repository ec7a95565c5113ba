//! Route table (SPEC_FULL §6 HTTP surface minimum). Grounded on
//! `orchestrator::api::routes::create_router`'s method-chained `Router`
//! construction, narrowed to the four documented endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/agents", get(handlers::list_agents))
        .route("/agents/register", post(handlers::register))
        .route("/agents/:agent_name/run", post(handlers::run))
        .with_state(state)
}
