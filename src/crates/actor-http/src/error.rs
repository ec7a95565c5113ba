//! HTTP error taxonomy and its `IntoResponse` conversion. Grounded on
//! `orchestrator::api::error::ApiError`'s status/code/message triple,
//! narrowed to the handlers this crate actually exposes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use actor_runtime::ActorError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub message: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown agent {0:?}")]
    UnknownAgent(String),
    #[error("agent {0:?} is already registered")]
    AlreadyRegistered(String),
    #[error("unknown agent kind {0:?}")]
    UnknownKind(String),
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("agent invocation failed: {0}")]
    AgentFailed(String),
    #[error("actor runtime error: {0}")]
    Actor(#[from] ActorError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownAgent(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            ApiError::UnknownKind(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AgentFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Actor(ActorError::UnknownActorType(_)) => StatusCode::NOT_FOUND,
            ApiError::Actor(ActorError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            ApiError::Actor(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::UnknownAgent(_) => "UNKNOWN_AGENT",
            ApiError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            ApiError::UnknownKind(_) => "UNKNOWN_KIND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::AgentFailed(_) => "AGENT_FAILED",
            ApiError::Actor(inner) => inner.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorBody { error: status.to_string(), message: self.to_string(), code: self.code() };
        tracing::error!(code = body.code, message = %body.message, "actor-http request failed");
        (status, Json(body)).into_response()
    }
}
