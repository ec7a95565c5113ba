//! The chat message type exchanged between agents, threads, and the actor
//! runtime's `AgentRunResponse`/`AgentRunResponseUpdate` payloads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::content::{AdditionalProperties, Content};

/// Who produced a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

impl ChatMessage {
    /// Construct a message with a single [`Content::Text`] part.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            contents: vec![Content::text(text)],
            author_name: None,
            message_id: None,
            additional_properties: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_name = Some(author.into());
        self
    }

    /// Concatenate all [`Content::Text`]/[`Content::TextReasoning`] parts.
    pub fn text_content(&self) -> String {
        self.contents
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// The structured handoff signal, if `additional_properties["handoff_to"]`
    /// names a string. This is the highest-precedence detection strategy in
    /// the handoff coordinator (see `handoff::signal`).
    pub fn structured_handoff_target(&self) -> Option<String> {
        self.additional_properties
            .as_ref()
            .and_then(|props| props.get("handoff_to"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// The tool-call handoff signal, if any [`Content::FunctionCall`] part
    /// encodes a handoff. Second-highest precedence.
    pub fn tool_call_handoff_target(&self) -> Option<String> {
        self.contents.iter().find_map(Content::handoff_target)
    }

    /// The best-effort text-hint handoff signal: a `HANDOFF_TO: <id>`
    /// substring on its own line. Lowest precedence, documented as
    /// best-effort rather than normative (see SPEC_FULL §9).
    pub fn text_hint_handoff_target(&self) -> Option<String> {
        self.text_content().lines().find_map(|line| {
            line.trim()
                .strip_prefix("HANDOFF_TO:")
                .map(|rest| rest.trim().to_string())
                .filter(|id| !id.is_empty())
        })
    }
}

/// `additional_properties` convenience constructor, kept separate from
/// [`HashMap::from`] call sites so tests read declaratively.
pub fn props(pairs: impl IntoIterator<Item = (&'static str, serde_json::Value)>) -> AdditionalProperties {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    map
}
