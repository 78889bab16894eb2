//! ADK gateway wire types.

use hubchat_core::{ChatMessage, ConversationMessage, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat request for the workbench and hub gateways.
#[derive(Debug, Clone, Serialize)]
pub struct AdkRequest {
    /// Framework tag, hub only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<&'static str>,
    /// Target agent.
    pub agent_id: String,
    /// History followed by the current message.
    pub messages: Vec<AdkMessage>,
    /// Session to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// One entry of the message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdkMessage {
    /// Role.
    pub role: Role,
    /// Content.
    pub content: String,
}

impl AdkMessage {
    /// History plus the outbound message, in order.
    pub fn conversation(history: &[ConversationMessage], message: &ChatMessage) -> Vec<Self> {
        history
            .iter()
            .map(|m| Self {
                role: m.role,
                content: m.content.clone(),
            })
            .chain(std::iter::once(Self {
                role: Role::User,
                content: message.content.clone(),
            }))
            .collect()
    }
}

/// Stream event, decoded from its `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum AdkEvent {
    /// Stream opened.
    StreamStart {
        /// Server-issued session id.
        session_id: Option<String>,
    },
    /// Content delta.
    TextToken {
        /// Delta text.
        content: String,
    },
    /// Stream finished.
    StreamEnd,
    /// Backend failure.
    Error {
        /// Error text.
        message: String,
    },
    /// Any other event, kept raw.
    Unknown(Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Tagged {
    StreamStart {
        #[serde(default)]
        session_id: Option<String>,
    },
    TextToken {
        #[serde(default)]
        content: String,
    },
    StreamEnd,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl AdkEvent {
    /// Decode an event. Anything without a known `type` becomes [`AdkEvent::Unknown`].
    pub fn decode(value: Value) -> Self {
        match Tagged::deserialize(&value) {
            Ok(Tagged::StreamStart { session_id }) => Self::StreamStart { session_id },
            Ok(Tagged::TextToken { content }) => Self::TextToken { content },
            Ok(Tagged::StreamEnd) => Self::StreamEnd,
            Ok(Tagged::Error { message }) => Self::Error {
                message: message.unwrap_or_else(|| "ADK stream error".to_string()),
            },
            Err(_) => Self::Unknown(value),
        }
    }

    /// Tag used when forwarding an unknown event.
    pub fn unknown_tag(value: &Value) -> &str {
        value
            .get("type")
            .or_else(|| value.get("event"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}
