//! Request/response DTOs for the HTTP surface. Grounded on
//! `orchestrator::api::models`'s plain serde-struct-per-endpoint shape.

use chat_contract::ChatMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    pub messages: Vec<ChatMessage>,
    /// Conversation to resume; a fresh id is minted when omitted.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Chunk the reply into word-increment progress updates instead of
    /// returning it in one response.
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResponseBody {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub agent_name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub agent_name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub agent_name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
