//! Agno wire types.

use hubchat_core::SelectedResource;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Default `user_id` form field when the config has none.
pub const DEFAULT_USER_ID: &str = "hubchat-user";

/// Agno run event tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AgnoEventKind {
    /// Team run started.
    TeamRunStarted,
    /// Team-level answer content.
    TeamRunContent,
    /// Team run finished.
    TeamRunCompleted,
    /// Team run failed.
    TeamRunError,
    /// Team run cancelled server-side.
    TeamRunCancelled,
    /// Team tool call started.
    TeamToolCallStarted,
    /// Team tool call finished.
    TeamToolCallCompleted,
    /// Team reasoning started.
    TeamReasoningStarted,
    /// Team reasoning step.
    TeamReasoningStep,
    /// Team reasoning finished.
    TeamReasoningCompleted,
    /// Team memory update started.
    TeamMemoryUpdateStarted,
    /// Team memory update finished.
    TeamMemoryUpdateCompleted,
    /// Agent run started.
    RunStarted,
    /// Agent-level content.
    RunContent,
    /// Agent run finished.
    RunCompleted,
    /// Agent run failed.
    RunError,
    /// Agent run cancelled server-side.
    RunCancelled,
    /// Agent tool call started.
    ToolCallStarted,
    /// Agent tool call finished.
    ToolCallCompleted,
    /// Agent reasoning started.
    ReasoningStarted,
    /// Agent reasoning step.
    ReasoningStep,
    /// Agent reasoning finished.
    ReasoningCompleted,
    /// Agent memory update started.
    MemoryUpdateStarted,
    /// Agent memory update finished.
    MemoryUpdateCompleted,
    /// Any tag not listed above.
    Other(String),
}

impl AgnoEventKind {
    /// Parse an `event` tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "TeamRunStarted" => Self::TeamRunStarted,
            "TeamRunContent" => Self::TeamRunContent,
            "TeamRunCompleted" => Self::TeamRunCompleted,
            "TeamRunError" => Self::TeamRunError,
            "TeamRunCancelled" => Self::TeamRunCancelled,
            "TeamToolCallStarted" => Self::TeamToolCallStarted,
            "TeamToolCallCompleted" => Self::TeamToolCallCompleted,
            "TeamReasoningStarted" => Self::TeamReasoningStarted,
            "TeamReasoningStep" => Self::TeamReasoningStep,
            "TeamReasoningCompleted" => Self::TeamReasoningCompleted,
            "TeamMemoryUpdateStarted" => Self::TeamMemoryUpdateStarted,
            "TeamMemoryUpdateCompleted" => Self::TeamMemoryUpdateCompleted,
            "RunStarted" => Self::RunStarted,
            "RunContent" => Self::RunContent,
            "RunCompleted" => Self::RunCompleted,
            "RunError" => Self::RunError,
            "RunCancelled" => Self::RunCancelled,
            "ToolCallStarted" => Self::ToolCallStarted,
            "ToolCallCompleted" => Self::ToolCallCompleted,
            "ReasoningStarted" => Self::ReasoningStarted,
            "ReasoningStep" => Self::ReasoningStep,
            "ReasoningCompleted" => Self::ReasoningCompleted,
            "MemoryUpdateStarted" => Self::MemoryUpdateStarted,
            "MemoryUpdateCompleted" => Self::MemoryUpdateCompleted,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::TeamRunStarted => "TeamRunStarted",
            Self::TeamRunContent => "TeamRunContent",
            Self::TeamRunCompleted => "TeamRunCompleted",
            Self::TeamRunError => "TeamRunError",
            Self::TeamRunCancelled => "TeamRunCancelled",
            Self::TeamToolCallStarted => "TeamToolCallStarted",
            Self::TeamToolCallCompleted => "TeamToolCallCompleted",
            Self::TeamReasoningStarted => "TeamReasoningStarted",
            Self::TeamReasoningStep => "TeamReasoningStep",
            Self::TeamReasoningCompleted => "TeamReasoningCompleted",
            Self::TeamMemoryUpdateStarted => "TeamMemoryUpdateStarted",
            Self::TeamMemoryUpdateCompleted => "TeamMemoryUpdateCompleted",
            Self::RunStarted => "RunStarted",
            Self::RunContent => "RunContent",
            Self::RunCompleted => "RunCompleted",
            Self::RunError => "RunError",
            Self::RunCancelled => "RunCancelled",
            Self::ToolCallStarted => "ToolCallStarted",
            Self::ToolCallCompleted => "ToolCallCompleted",
            Self::ReasoningStarted => "ReasoningStarted",
            Self::ReasoningStep => "ReasoningStep",
            Self::ReasoningCompleted => "ReasoningCompleted",
            Self::MemoryUpdateStarted => "MemoryUpdateStarted",
            Self::MemoryUpdateCompleted => "MemoryUpdateCompleted",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for AgnoEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded Agno event.
#[derive(Debug, Clone, PartialEq)]
pub struct AgnoEvent {
    /// Event tag.
    pub kind: AgnoEventKind,
    /// Text content. Structured `content` (set when the agent has a
    /// response model) is rendered as compact JSON.
    pub content: Option<String>,
    /// Session the run belongs to.
    pub session_id: Option<String>,
    /// The full payload.
    pub raw: Value,
}

impl AgnoEvent {
    /// Decode a payload. Returns `None` when it has no `event` tag.
    pub fn decode(raw: Value) -> Option<Self> {
        let kind = AgnoEventKind::from_tag(raw.get("event")?.as_str()?);
        let content = raw.get("content").and_then(content_text);
        let session_id = string_field(&raw, "session_id").filter(|s| !s.is_empty());
        Some(Self {
            kind,
            content,
            session_id,
            raw,
        })
    }

    /// Human-readable error text of an error event.
    pub fn error_message(&self) -> String {
        self.content
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| string_field(&self.raw, "error"))
            .or_else(|| string_field(&self.raw, "message"))
            .unwrap_or_else(|| format!("Agno {} event", self.kind))
    }
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Hub request body.
#[derive(Debug, Clone, Serialize)]
pub struct AgnoHubRequest {
    /// Always `"agno"`.
    pub framework: &'static str,
    /// Agent registered with the hub.
    pub agent_id: String,
    /// Session to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// History-prefixed message text.
    pub content: String,
    /// Team or agent to run.
    pub selected_resource: SelectedResource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("TeamRunContent", AgnoEventKind::TeamRunContent)]
    #[case("RunCompleted", AgnoEventKind::RunCompleted)]
    #[case("TeamToolCallStarted", AgnoEventKind::TeamToolCallStarted)]
    #[case("MemoryUpdateCompleted", AgnoEventKind::MemoryUpdateCompleted)]
    #[case("RunPaused", AgnoEventKind::Other("RunPaused".into()))]
    fn test_kind_round_trips_tag(#[case] tag: &str, #[case] kind: AgnoEventKind) {
        assert_eq!(AgnoEventKind::from_tag(tag), kind);
        assert_eq!(kind.as_str(), tag);
    }

    #[test]
    fn test_decode_event() {
        let event = AgnoEvent::decode(json!({
            "event": "RunContent",
            "content": "Hi",
            "session_id": "sess-1",
            "run_id": "r1"
        }))
        .unwrap();
        assert_eq!(event.kind, AgnoEventKind::RunContent);
        assert_eq!(event.content.as_deref(), Some("Hi"));
        assert_eq!(event.session_id.as_deref(), Some("sess-1"));
        assert_eq!(event.raw["run_id"], "r1");
    }

    #[test]
    fn test_decode_requires_tag() {
        assert!(AgnoEvent::decode(json!({"content": "x"})).is_none());
        assert!(AgnoEvent::decode(json!({"event": 3})).is_none());

        let event = AgnoEvent::decode(json!({"event": "RunContent", "content": null})).unwrap();
        assert_eq!(event.content, None);
    }

    #[rstest]
    #[case(json!({"answer": 42}), "{\"answer\":42}")]
    #[case(json!(["a", "b"]), "[\"a\",\"b\"]")]
    #[case(json!(42), "42")]
    #[case(json!(true), "true")]
    fn test_decode_structured_content(#[case] content: Value, #[case] expected: &str) {
        let event = AgnoEvent::decode(json!({"event": "RunContent", "content": content})).unwrap();
        assert_eq!(event.content.as_deref(), Some(expected));
    }

    #[test]
    fn test_error_message_fallbacks() {
        let event = AgnoEvent::decode(json!({"event": "RunError", "content": "boom"})).unwrap();
        assert_eq!(event.error_message(), "boom");
        let event = AgnoEvent::decode(json!({"event": "RunError", "error": "bad"})).unwrap();
        assert_eq!(event.error_message(), "bad");
        let event = AgnoEvent::decode(json!({"event": "TeamRunError"})).unwrap();
        assert_eq!(event.error_message(), "Agno TeamRunError event");
    }
}
