//! Langchain request templating and response extraction.

use hubchat_core::{AdapterError, AdapterResult, ConversationMessage};
use serde::Serialize;
use serde_json::{json, Value};
use std::borrow::Cow;

/// Placeholder replaced by the message text in a request template.
pub const MESSAGE_PLACEHOLDER: &str = "{{message}}";

/// Fields tried, in order, when a JSON response has no configured path.
pub const FALLBACK_RESPONSE_FIELDS: &[&str] = &[
    "output", "content", "response", "answer", "result", "text", "message",
];

/// Build a request body from a user template.
///
/// `"{{message}}"` (quoted) becomes a JSON string; a bare `{{message}}`
/// inside an existing string literal is replaced by the escaped text.
pub fn render_template(template: &str, message: &str) -> AdapterResult<Value> {
    let quoted = serde_json::to_string(message)?;
    let escaped = &quoted[1..quoted.len() - 1];

    let rendered = template
        .replace(&format!("\"{MESSAGE_PLACEHOLDER}\""), &quoted)
        .replace(MESSAGE_PLACEHOLDER, escaped);

    serde_json::from_str(&rendered).map_err(|e| {
        AdapterError::configuration(format!("invalid Langchain request template: {e}"))
    })
}

/// Body used when no template is configured.
pub fn default_body(message: &str, conversation_id: &str) -> Value {
    json!({
        "input": message,
        "config": {
            "metadata": {
                "conversation_id": conversation_id
            }
        }
    })
}

/// Content of one streamed event, from the shapes Langchain servers emit.
///
/// Tried in order: a bare scalar (string, number, bool), `output` (string,
/// or object with a string `content`), `content`, `delta`, `data.output`.
pub fn extract_stream_content(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => return Some(Cow::Borrowed(text)),
        Value::Number(_) | Value::Bool(_) => return Some(Cow::Owned(value.to_string())),
        _ => {}
    }

    if let Some(output) = value.get("output") {
        if let Some(text) = output.as_str() {
            return Some(Cow::Borrowed(text));
        }
        if let Some(text) = output.get("content").and_then(Value::as_str) {
            return Some(Cow::Borrowed(text));
        }
    }

    value
        .get("content")
        .and_then(Value::as_str)
        .or_else(|| value.get("delta").and_then(Value::as_str))
        .or_else(|| value.pointer("/data/output").and_then(Value::as_str))
        .map(Cow::Borrowed)
}

/// Look up a dot-separated path; numeric segments index arrays.
///
/// `choices.0.message.content` reads the first choice's message content.
pub fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(segment),
            _ => None,
        })
}

/// Answer text of a blocking JSON response.
///
/// Uses `path` when given, else the first present fallback field. Non-string
/// values are serialized; with nothing found the whole body is used.
pub fn extract_response_text(body: &Value, path: Option<&str>) -> String {
    let found = match path.filter(|p| !p.trim().is_empty()) {
        Some(path) => extract_path(body, path),
        None => FALLBACK_RESPONSE_FIELDS
            .iter()
            .find_map(|field| body.get(*field).filter(|v| !v.is_null())),
    };

    match found.unwrap_or(body) {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Hub request body.
#[derive(Debug, Clone, Serialize)]
pub struct LangchainHubRequest {
    /// Always `"langchain"`.
    pub framework: &'static str,
    /// Agent registered with the hub.
    pub agent_id: String,
    /// Session to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// History followed by the current message.
    pub messages: Vec<ConversationMessage>,
}
