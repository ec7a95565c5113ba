//! Request handlers for the HTTP surface (SPEC_FULL §6). Grounded on
//! `orchestrator::api::handlers::health`'s thin extract-call-respond shape.

use std::sync::Arc;

use actor_runtime::{ActorHandler, ActorId, ActorResponseStatus};
use agent_actor::{AgentActor, AgentRunResponse};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{AgentListResponse, AgentSummary, HealthResponse, RegisterRequest, RegisterResponse, RunRequest, RunResponseBody};
use crate::state::AppState;
use crate::streaming::{self, StreamFormat};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn list_agents(State(state): State<AppState>) -> Json<AgentListResponse> {
    let agents = state.list_registered().into_iter().map(|a| AgentSummary { agent_name: a.agent_name, kind: a.kind }).collect();
    Json(AgentListResponse { agents })
}

pub async fn register(State(state): State<AppState>, Json(payload): Json<RegisterRequest>) -> Result<Json<RegisterResponse>, ApiError> {
    if state.is_registered(&payload.agent_name) {
        return Err(ApiError::AlreadyRegistered(payload.agent_name));
    }
    let factory = state.catalogue.factory_for(&payload.kind).ok_or_else(|| ApiError::UnknownKind(payload.kind.clone()))?;

    state.runtime.registry().register(
        payload.agent_name.clone(),
        Arc::new(move |_id: &ActorId| Arc::new(AgentActor::new(factory())) as Arc<dyn ActorHandler>),
    );
    state.mark_registered(payload.agent_name.clone(), payload.kind.clone());

    Ok(Json(RegisterResponse { agent_name: payload.agent_name, kind: payload.kind }))
}

pub async fn run(State(state): State<AppState>, Path(agent_name): Path<String>, Json(payload): Json<RunRequest>) -> Result<Response, ApiError> {
    if !state.is_registered(&agent_name) {
        return Err(ApiError::UnknownAgent(agent_name));
    }

    let thread_id = payload.thread_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let actor_id = ActorId::new(agent_name, thread_id.clone()).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let params = serde_json::json!({ "messages": payload.messages });

    let handle = state.runtime.send_request(actor_id, "run", params)?;
    let response = handle.get_response().await?;

    match response.status {
        ActorResponseStatus::Completed => {
            let parsed: AgentRunResponse = serde_json::from_value(response.data.unwrap_or(Value::Null)).map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if payload.stream {
                Ok(streaming::simulate(&thread_id, &parsed.messages, StreamFormat::WordChunks))
            } else {
                Ok(Json(RunResponseBody { thread_id, messages: parsed.messages }).into_response())
            }
        }
        ActorResponseStatus::Failed => {
            let data = response.data.unwrap_or_else(|| serde_json::json!({}));
            Err(ApiError::AgentFailed(data["message"].as_str().unwrap_or_default().to_string()))
        }
        other => Err(ApiError::AgentFailed(format!("unexpected response status {other:?}"))),
    }
}
