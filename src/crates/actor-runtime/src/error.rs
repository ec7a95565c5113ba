//! Actor runtime error taxonomy (SPEC_FULL §4.4, §7).

use thiserror::Error;

use crate::actor_id::ActorId;

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("no factory registered for actor type {0:?}")]
    UnknownActorType(String),
    #[error("invalid actor id: {0}")]
    InvalidId(#[from] chat_contract::validation::InvalidId),
    #[error("actor {0} has already shut down")]
    ActorStopped(ActorId),
    #[error("state store error: {0}")]
    StateStore(String),
    #[error("request {0} not found")]
    RequestNotFound(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("handler failed: {0}")]
    HandlerFailed(String),
}

impl ActorError {
    /// Stable tag for the `kind` field of a `Failed` response's error
    /// envelope, alongside the human-readable `message` (§7).
    pub fn kind(&self) -> &'static str {
        match self {
            ActorError::UnknownActorType(_) => "UnknownActorType",
            ActorError::InvalidId(_) => "InvalidId",
            ActorError::ActorStopped(_) => "ActorStopped",
            ActorError::StateStore(_) => "StateStore",
            ActorError::RequestNotFound(_) => "RequestNotFound",
            ActorError::Serialization(_) => "Serialization",
            ActorError::HandlerFailed(_) => "HandlerFailed",
        }
    }
}

pub type Result<T> = std::result::Result<T, ActorError>;
