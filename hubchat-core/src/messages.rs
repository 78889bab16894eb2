//! Chat message types shared by every adapter.
//!
//! Outbound values ([`ChatMessage`], [`ConversationMessage`]) are built by the
//! caller per send. Inbound values ([`ChatResponseChunk`], [`ChatResponse`],
//! [`SystemEvent`]) are produced by adapters and handed to the UI layer.
//!
//! Chunk content is always the *accumulated* value so far, never a delta, so
//! consumers can render idempotently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifier::now_utc;

/// Role of a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message written by the user.
    User,
    /// Message produced by the agent.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Human-readable label used when history is folded into a prompt.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// Outbound message for one send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message text.
    pub content: String,
    /// When the user sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: Some(now_utc()),
        }
    }

    /// Create a message without a timestamp.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp: None,
        }
    }
}

impl From<&str> for ChatMessage {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for ChatMessage {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// One entry of the conversation context passed with every send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Who wrote it.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl ConversationMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Fold the history and the current message into one prompt string.
///
/// Used by backends that accept a single text field instead of a message list.
/// With an empty history the message is returned unchanged.
#[must_use]
pub fn format_history_prompt(history: &[ConversationMessage], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let mut prompt = String::from("Previous conversation:\n");
    for entry in history {
        prompt.push_str(entry.role.label());
        prompt.push_str(": ");
        prompt.push_str(&entry.content);
        prompt.push('\n');
    }
    prompt.push_str("\nCurrent message: ");
    prompt.push_str(message);
    prompt
}

/// Incremental update emitted while a response streams in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseChunk {
    /// Full answer text accumulated so far.
    pub content: String,
    /// Always `false`; completion is signalled through `on_complete`.
    pub is_complete: bool,
    /// Full reasoning text accumulated so far, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

impl ChatResponseChunk {
    /// Build a chunk from the two accumulators. Empty reasoning is omitted.
    pub fn new(content: impl Into<String>, reasoning: &str) -> Self {
        Self {
            content: content.into(),
            is_complete: false,
            reasoning_content: non_empty(reasoning),
        }
    }
}

/// Terminal response of a send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Final answer text.
    pub content: String,
    /// When the response completed.
    pub timestamp: DateTime<Utc>,
    /// Final reasoning text, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
}

impl ChatResponse {
    /// Build the terminal response. Empty reasoning is omitted.
    pub fn new(content: impl Into<String>, reasoning: &str) -> Self {
        Self {
            content: content.into(),
            timestamp: now_utc(),
            reasoning_content: non_empty(reasoning),
        }
    }
}

/// Backend telemetry that is not part of the visible answer (tool calls, lifecycle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    /// Backend-defined tag, e.g. `ToolCallStarted`.
    pub event: String,
    /// Raw payload.
    pub data: Value,
    /// Arrival time.
    pub timestamp: DateTime<Utc>,
}

impl SystemEvent {
    /// Create an event stamped with the current time.
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            timestamp: now_utc(),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_history_prompt_empty() {
        assert_eq!(format_history_prompt(&[], "hello"), "hello");
    }

    #[test]
    fn test_history_prompt_with_history() {
        let history = vec![
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("hello there"),
        ];
        let prompt = format_history_prompt(&history, "how are you?");
        assert_eq!(
            prompt,
            "Previous conversation:\nUser: hi\nAssistant: hello there\n\nCurrent message: how are you?"
        );
    }

    #[test]
    fn test_chunk_omits_empty_reasoning() {
        let chunk = ChatResponseChunk::new("answer", "");
        assert_eq!(chunk.reasoning_content, None);
        assert!(!chunk.is_complete);

        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json, serde_json::json!({"content": "answer", "isComplete": false}));
    }

    #[test]
    fn test_response_keeps_reasoning() {
        let response = ChatResponse::new("AC", "B");
        assert_eq!(response.content, "AC");
        assert_eq!(response.reasoning_content.as_deref(), Some("B"));
    }

    #[test]
    fn test_role_serde() {
        let msg: ConversationMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"x"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
