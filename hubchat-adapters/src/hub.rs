//! Gateway ("hub") envelope shared by the hub-proxied adapters.
//!
//! The hub forwards each framework's native events and adds an outer
//! `{type: stream_start | stream_end | error}` layer. Envelope events are
//! handled here; everything else goes to the framework's own handler.

use hubchat_core::AdapterError;
use hubchat_streaming::SsePayload;
use serde::Deserialize;
use serde_json::Value;

use crate::sink::ResponseSink;
use crate::stream::PayloadHandler;

/// Path of the gateway chat endpoint.
pub const HUB_CHAT_PATH: &str = "/api/hub/chat/stream";

/// Outer event layer of a hub stream.
#[derive(Debug, Clone, PartialEq)]
pub enum HubEnvelope {
    /// The gateway opened the stream, possibly assigning a session.
    StreamStart {
        /// Session id issued by the gateway.
        session_id: Option<String>,
    },
    /// The gateway closed the stream.
    StreamEnd,
    /// The gateway reported a failure.
    Error {
        /// Error text.
        message: String,
    },
    /// A forwarded framework event.
    Inner(Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    StreamStart {
        #[serde(default)]
        session_id: Option<String>,
    },
    StreamEnd,
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl HubEnvelope {
    /// Split off envelope events. Payloads carrying an `event` tag are always inner.
    pub fn decode(value: Value) -> Self {
        if value.get("event").is_some() {
            return Self::Inner(value);
        }
        match Envelope::deserialize(&value) {
            Ok(Envelope::StreamStart { session_id }) => Self::StreamStart { session_id },
            Ok(Envelope::StreamEnd) => Self::StreamEnd,
            Ok(Envelope::Error { message, error }) => Self::Error {
                message: message
                    .or(error)
                    .unwrap_or_else(|| "hub stream error".to_string()),
            },
            Err(_) => Self::Inner(value),
        }
    }
}

/// Unwraps the hub envelope, delegating inner events to `H`.
#[derive(Debug)]
pub(crate) struct HubHandler<H> {
    inner: H,
}

impl<H> HubHandler<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: PayloadHandler> PayloadHandler for HubHandler<H> {
    fn handle(&mut self, payload: SsePayload, sink: &mut ResponseSink<'_>) {
        let SsePayload::Json(value) = payload else {
            self.inner.handle(payload, sink);
            return;
        };

        match HubEnvelope::decode(value) {
            HubEnvelope::StreamStart { session_id } => {
                if let Some(id) = session_id {
                    sink.surface_session_id(&id);
                }
            }
            HubEnvelope::StreamEnd => sink.finish_stream(),
            HubEnvelope::Error { message } => sink.fail(AdapterError::backend(message)),
            HubEnvelope::Inner(value) => self.inner.handle(SsePayload::Json(value), sink),
        }
    }
}

/// Full gateway URL for an endpoint.
pub(crate) fn hub_url(base_url: &str) -> String {
    format!("{base_url}{HUB_CHAT_PATH}")
}
