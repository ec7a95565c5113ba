//! The closed tagged union of chat message content parts.
//!
//! Source languages with class inheritance model content as a hierarchy of
//! subclasses sharing a base header. Rust has no such hierarchy, so `Content`
//! is a flat enum with a `type` discriminator (serde's adjacently/internally
//! tagged representation) and every variant carries the same optional
//! `ContentHeader` fields inline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::usage::UsageDetails;

/// Fields every content variant carries, mirrored from the source's shared
/// base class rather than factored into a separate struct field, so that
/// `#[serde(tag = "type")]` flattening keeps a single JSON object per part.
pub type AdditionalProperties = HashMap<String, Value>;

/// One part of a [`crate::ChatMessage`]'s content list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text.
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// Model "thinking"/reasoning text, kept distinct from user-facing text.
    TextReasoning {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// Inline base64 data, always a well-formed
    /// `data:<mediatype>;base64,<data>` URI (see [`crate::data_uri`]).
    Data {
        uri: String,
        media_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// A remote resource referenced by URL.
    Uri {
        uri: String,
        media_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// A request to invoke a named function/tool.
    FunctionCall {
        call_id: String,
        name: String,
        #[serde(default)]
        arguments: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// The result of a previously-issued [`Content::FunctionCall`].
    FunctionResult {
        call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exception: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// Token usage reported inline in a message stream.
    Usage {
        details: UsageDetails,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
    /// An inline error surfaced as content rather than a transport failure.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        additional_properties: Option<AdditionalProperties>,
    },
}

impl Content {
    /// Shorthand for a plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text {
            text: text.into(),
            additional_properties: None,
        }
    }

    /// Build a [`Content::Data`] part from a media type and raw bytes,
    /// formatting the data URI per [`crate::data_uri::format`].
    pub fn data(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        let media_type = media_type.into();
        let uri = crate::data_uri::format(&media_type, bytes);
        Content::Data {
            uri,
            media_type,
            additional_properties: None,
        }
    }

    /// Returns the text of this part if it is [`Content::Text`] or
    /// [`Content::TextReasoning`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text { text, .. } | Content::TextReasoning { text, .. } => Some(text),
            _ => None,
        }
    }

    /// True if this part is a [`Content::FunctionCall`] whose name matches
    /// the handoff tool-call convention `handoff_to_<id>`, or whose
    /// arguments carry `{"handoff_to": id}`. Used by the handoff
    /// coordinator's tool-call detection strategy.
    pub fn handoff_target(&self) -> Option<String> {
        let Content::FunctionCall { name, arguments, .. } = self else {
            return None;
        };
        if let Some(id) = name.strip_prefix("handoff_to_") {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
        arguments
            .get("handoff_to")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trips_through_json() {
        let c = Content::text("hi");
        let v = serde_json::to_value(&c).unwrap();
        let back: Content = serde_json::from_value(v).unwrap();
        assert_eq!(c, back);
    }

    #[test]
    fn handoff_target_from_tool_name() {
        let c = Content::FunctionCall {
            call_id: "1".into(),
            name: "handoff_to_escalation".into(),
            arguments: serde_json::json!({}),
            additional_properties: None,
        };
        assert_eq!(c.handoff_target().as_deref(), Some("escalation"));
    }

    #[test]
    fn handoff_target_from_arguments() {
        let c = Content::FunctionCall {
            call_id: "1".into(),
            name: "some_tool".into(),
            arguments: serde_json::json!({"handoff_to": "specialist"}),
            additional_properties: None,
        };
        assert_eq!(c.handoff_target().as_deref(), Some("specialist"));
    }

    #[test]
    fn non_function_call_has_no_handoff_target() {
        assert_eq!(Content::text("hi").handoff_target(), None);
    }
}
