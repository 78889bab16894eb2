//! ADK adapter.
//!
//! ADK agents are reached through the console's gateways: the workbench
//! gateway for the direct variant, the hub gateway for the proxied one. Both
//! stream `{type, content?, session_id?, message?}` events. ADK output is
//! plain text; it never goes through the reasoning splitter.

mod types;

pub use types::{AdkEvent, AdkMessage, AdkRequest};

use async_trait::async_trait;
use hubchat_core::{
    AdapterConfig, AdapterError, AdapterResult, AdapterVariant, ChatMessage, ConversationMessage,
    Framework,
};
use hubchat_streaming::SsePayload;
use tracing::{debug, warn};

use crate::adapter::{ChatAdapter, SendOutcome};
use crate::callbacks::ChatCallbacks;
use crate::hub::{hub_url, HubHandler};
use crate::sink::ResponseSink;
use crate::state::AdapterState;
use crate::stream::{run_sse, PayloadHandler};

/// Path of the workbench gateway chat endpoint.
pub const WORKBENCH_CHAT_PATH: &str = "/api/workbench/chat/stream";

/// Adapter for ADK agents behind the workbench or hub gateway.
#[derive(Debug, Default)]
pub struct AdkAdapter {
    variant: AdapterVariant,
    state: AdapterState,
}

impl AdkAdapter {
    /// Adapter using the workbench gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter using the hub gateway, which tracks a server-held session.
    #[must_use]
    pub fn hub() -> Self {
        Self {
            variant: AdapterVariant::Hub,
            state: AdapterState::default(),
        }
    }

    fn url(&self, config: &AdapterConfig) -> String {
        match self.variant {
            AdapterVariant::Direct => format!("{}{WORKBENCH_CHAT_PATH}", config.base_url()),
            AdapterVariant::Hub => hub_url(config.base_url()),
        }
    }
}

#[async_trait]
impl ChatAdapter for AdkAdapter {
    fn framework(&self) -> Framework {
        Framework::Adk
    }

    fn variant(&self) -> AdapterVariant {
        self.variant
    }

    fn initialize(&self, config: AdapterConfig) -> AdapterResult<()> {
        self.state.initialize(config)
    }

    async fn send_message(
        &self,
        message: ChatMessage,
        callbacks: &mut dyn ChatCallbacks,
        history: &[ConversationMessage],
    ) -> AdapterResult<SendOutcome> {
        let init = self.state.snapshot()?;
        let guard = self.state.lifecycle.begin()?;
        let agent_id = init.config.require_agent_id("ADK adapter")?;

        let request = AdkRequest {
            framework: (self.variant == AdapterVariant::Hub).then(|| Framework::Adk.wire_tag()),
            agent_id: agent_id.to_string(),
            messages: AdkMessage::conversation(history, &message),
            session_id: self.state.session_id(),
        };
        let url = self.url(&init.config);
        debug!(%url, agent_id, variant = ?self.variant, "sending ADK message");

        let builder = init.post(&url).json(&request);
        let token = guard.token().clone();
        let outcome = match self.variant {
            AdapterVariant::Direct => {
                run_sse(&self.state, &init, token, builder, AdkHandler, callbacks).await
            }
            AdapterVariant::Hub => {
                let handler = HubHandler::new(AdkHandler);
                run_sse(&self.state, &init, token, builder, handler, callbacks).await
            }
        };
        Ok(outcome)
    }

    fn cancel(&self) {
        if self.state.lifecycle.cancel() {
            debug!("ADK send cancelled");
        }
    }

    fn dispose(&self) {
        self.state.dispose();
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn session_id(&self) -> Option<String> {
        self.state.session_id()
    }
}

/// Maps ADK events onto the sink.
///
/// Under the hub the envelope handler consumes `stream_start`, so the session
/// id is only surfaced there; here it is logged.
#[derive(Debug)]
struct AdkHandler;

impl PayloadHandler for AdkHandler {
    fn handle(&mut self, payload: SsePayload, sink: &mut ResponseSink<'_>) {
        let value = match payload {
            SsePayload::Json(value) => value,
            SsePayload::Text(text) => {
                warn!(payload = %text, "skipping malformed ADK event");
                return;
            }
            SsePayload::Done => return,
        };

        match AdkEvent::decode(value) {
            AdkEvent::StreamStart { session_id } => {
                debug!(session_id = ?session_id, "ADK stream started");
            }
            AdkEvent::TextToken { content } => sink.push_raw(&content),
            AdkEvent::StreamEnd => sink.finish_stream(),
            AdkEvent::Error { message } => sink.fail(AdapterError::backend(message)),
            AdkEvent::Unknown(value) => {
                let tag = AdkEvent::unknown_tag(&value).to_string();
                sink.system_event(tag, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{CollectingCallbacks, FnCallbacks};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(events: &[serde_json::Value]) -> String {
        events.iter().map(|e| format!("data: {e}\n\n")).collect()
    }

    fn sse_response(body: String) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
    }

    fn config(server: &MockServer) -> AdapterConfig {
        AdapterConfig::new(server.uri()).with_agent_id("agent-1")
    }

    #[tokio::test]
    async fn test_direct_streams_accumulated_chunks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(WORKBENCH_CHAT_PATH))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "agent_id": "agent-1",
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "more"}
                ]
            })))
            .respond_with(sse_response(sse(&[
                json!({"type": "stream_start", "session_id": "adk-1"}),
                json!({"type": "text_token", "content": "Hel"}),
                json!({"type": "text_token", "content": "lo <think>x</think>"}),
                json!({"type": "stream_end"}),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = AdkAdapter::new();
        adapter.initialize(config(&server).with_api_key("secret")).unwrap();

        let mut callbacks = CollectingCallbacks::new();
        let history = [
            ConversationMessage::user("hi"),
            ConversationMessage::assistant("hello"),
        ];
        let outcome = adapter
            .send_message(ChatMessage::new("more"), &mut callbacks, &history)
            .await
            .unwrap();

        assert_eq!(outcome, SendOutcome::Completed);
        let contents: Vec<_> = callbacks.chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["Hel", "Hello <think>x</think>"]);
        let response = callbacks.response().unwrap();
        assert_eq!(response.content, "Hello <think>x</think>");
        assert_eq!(response.reasoning_content, None);
        // The direct variant never surfaces the session id.
        assert!(callbacks.session_ids.is_empty());
        assert_eq!(adapter.session_id(), None);
    }

    #[tokio::test]
    async fn test_unknown_and_error_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse_response(format!(
                "{}data: not json\n\n{}",
                sse(&[
                    json!({"type": "tool_call", "name": "search"}),
                    json!({"type": "text_token", "content": "partial"}),
                ]),
                sse(&[
                    json!({"type": "error", "message": "agent crashed"}),
                    json!({"type": "text_token", "content": "ignored"}),
                ])
            )))
            .mount(&server)
            .await;

        let adapter = AdkAdapter::new();
        adapter.initialize(config(&server)).unwrap();
        let mut callbacks = CollectingCallbacks::new();
        let outcome = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap();

        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(callbacks.system_event_names(), vec!["tool_call"]);
        assert_eq!(callbacks.chunks.len(), 1);
        assert_eq!(callbacks.terminal_count(), 1);
        assert!(matches!(&callbacks.errors[0], AdapterError::Backend(m) if m == "agent crashed"));
    }

    #[tokio::test]
    async fn test_hub_surfaces_and_reuses_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/hub/chat/stream"))
            .and(body_json(json!({
                "framework": "adk",
                "agent_id": "agent-1",
                "messages": [{"role": "user", "content": "first"}]
            })))
            .respond_with(sse_response(sse(&[
                json!({"type": "stream_start", "session_id": "hub-9"}),
                json!({"type": "text_token", "content": "one"}),
                json!({"type": "stream_end"}),
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/hub/chat/stream"))
            .and(body_json(json!({
                "framework": "adk",
                "agent_id": "agent-1",
                "messages": [{"role": "user", "content": "second"}],
                "session_id": "hub-9"
            })))
            .respond_with(sse_response(sse(&[
                json!({"type": "stream_start", "session_id": "hub-9"}),
                json!({"type": "text_token", "content": "two"}),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = AdkAdapter::hub();
        assert_eq!(adapter.variant(), AdapterVariant::Hub);
        adapter.initialize(config(&server)).unwrap();

        let mut first = CollectingCallbacks::new();
        adapter
            .send_message("first".into(), &mut first, &[])
            .await
            .unwrap();
        assert_eq!(first.session_ids, vec!["hub-9".to_string()]);
        assert_eq!(adapter.session_id().as_deref(), Some("hub-9"));

        // Same id again: not re-surfaced. No stream_end: finalized at end of body.
        let mut second = CollectingCallbacks::new();
        let outcome = adapter
            .send_message("second".into(), &mut second, &[])
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Completed);
        assert!(second.session_ids.is_empty());
        assert_eq!(second.response().unwrap().content, "two");
    }

    #[tokio::test]
    async fn test_http_error_reported_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let adapter = AdkAdapter::new();
        adapter.initialize(config(&server)).unwrap();
        let mut callbacks = CollectingCallbacks::new();
        let outcome = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap();

        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(callbacks.terminal_count(), 1);
        match &callbacks.errors[0] {
            AdapterError::Http { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(callbacks.errors[0].is_retryable());
    }

    #[tokio::test]
    async fn test_configuration_errors_before_network() {
        let adapter = AdkAdapter::new();
        let mut callbacks = CollectingCallbacks::new();
        let err = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: adapter not initialized");

        adapter
            .initialize(AdapterConfig::new("http://127.0.0.1:9"))
            .unwrap();
        let err = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(callbacks.terminal_count(), 0);
        assert!(!adapter.state.lifecycle.is_in_flight());
    }

    #[tokio::test]
    async fn test_cancel_from_chunk_callback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse_response(sse(&[
                json!({"type": "text_token", "content": "a"}),
                json!({"type": "text_token", "content": "b"}),
                json!({"type": "stream_end"}),
            ])))
            .mount(&server)
            .await;

        let adapter = Arc::new(AdkAdapter::new());
        adapter.initialize(config(&server)).unwrap();

        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let handle = Arc::clone(&adapter);
        let (chunk_log, complete_log, error_log) =
            (Arc::clone(&events), Arc::clone(&events), Arc::clone(&events));
        let mut callbacks = FnCallbacks::new()
            .with_chunk(move |chunk| {
                chunk_log.lock().push(format!("chunk:{}", chunk.content));
                handle.cancel();
            })
            .with_complete(move |_| complete_log.lock().push("complete".into()))
            .with_error(move |_| error_log.lock().push("error".into()));

        let outcome = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap();

        assert_eq!(outcome, SendOutcome::Cancelled);
        assert_eq!(*events.lock(), vec!["chunk:a".to_string()]);
        assert!(!adapter.state.lifecycle.is_in_flight());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_and_busy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                sse_response(sse(&[json!({"type": "stream_end"})]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let adapter = Arc::new(AdkAdapter::new());
        adapter.initialize(config(&server)).unwrap();

        let task = {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move {
                let mut callbacks = CollectingCallbacks::new();
                let outcome = adapter
                    .send_message("slow".into(), &mut callbacks, &[])
                    .await
                    .unwrap();
                (outcome, callbacks)
            })
        };

        while !adapter.state.lifecycle.is_in_flight() {
            tokio::task::yield_now().await;
        }
        let mut other = CollectingCallbacks::new();
        let err = adapter
            .send_message("concurrent".into(), &mut other, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Busy));

        adapter.cancel();
        adapter.cancel();
        let (outcome, callbacks) = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SendOutcome::Cancelled);
        assert_eq!(callbacks.terminal_count(), 0);
    }

    #[tokio::test]
    async fn test_dispose_requires_reinitialize() {
        let adapter = AdkAdapter::hub();
        adapter
            .initialize(AdapterConfig::new("http://localhost:8000").with_agent_id("a"))
            .unwrap();
        adapter.dispose();
        adapter.dispose();

        let mut callbacks = CollectingCallbacks::new();
        let err = adapter
            .send_message("hi".into(), &mut callbacks, &[])
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
