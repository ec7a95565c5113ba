//! The narrow seam external chat-model providers implement.
//!
//! Concrete providers (OpenAI, Azure, Bedrock, Google, ...) are explicitly
//! out of scope for this core (see SPEC_FULL §1). `ChatClient` is the only
//! abstraction the core consumes; no implementation of it lives in this
//! crate.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::ChatMessage;
use crate::tools::SharedToolList;

#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error("chat client transport error: {0}")]
    Transport(String),
    #[error("chat client returned no message")]
    EmptyResponse,
}

/// A single non-streaming completion of a conversation turn.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Complete the conversation, optionally with a shared tool list the
    /// client may consult mid-call (see [`SharedToolList`]).
    async fn complete(&self, messages: &[ChatMessage], tools: Option<&SharedToolList>) -> Result<ChatMessage, ChatClientError>;
}
