//! Langchain adapter.
//!
//! Langchain deployments vary widely, so the direct variant is driven by the
//! configuration: the request body comes from a template (or a LangServe-style
//! default) and the response is either an SSE stream or one JSON document.
//! Streams end on `[DONE]` or when the body ends, whichever comes first.

mod types;

pub use types::{
    default_body, extract_path, extract_response_text, extract_stream_content, render_template,
    LangchainHubRequest, FALLBACK_RESPONSE_FIELDS, MESSAGE_PLACEHOLDER,
};

use async_trait::async_trait;
use hubchat_core::identifier::generate_conversation_id;
use hubchat_core::{
    format_history_prompt, AdapterConfig, AdapterResult, AdapterVariant, ChatMessage,
    ConversationMessage, Framework, ResponseFormat,
};
use hubchat_streaming::{ReasoningSplitter, SsePayload};
use reqwest::RequestBuilder;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use crate::adapter::{ChatAdapter, SendOutcome};
use crate::callbacks::ChatCallbacks;
use crate::hub::{hub_url, HubHandler};
use crate::sink::ResponseSink;
use crate::state::{AdapterState, Initialized};
use crate::stream::{read_body, run_sse, send_request, send_span, PayloadHandler};

/// Adapter for Langchain / LangServe endpoints.
#[derive(Debug)]
pub struct LangchainAdapter {
    variant: AdapterVariant,
    state: AdapterState,
    conversation_id: String,
}

impl Default for LangchainAdapter {
    fn default() -> Self {
        Self {
            variant: AdapterVariant::Direct,
            state: AdapterState::default(),
            conversation_id: generate_conversation_id(),
        }
    }
}

impl LangchainAdapter {
    /// Adapter posting to the configured endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter going through the hub gateway.
    #[must_use]
    pub fn hub() -> Self {
        Self {
            variant: AdapterVariant::Hub,
            ..Self::default()
        }
    }

    /// Conversation id sent in the default body when no session id is configured.
    #[must_use]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    fn direct_body(&self, config: &AdapterConfig, text: &str) -> AdapterResult<Value> {
        match config.request_template.as_deref() {
            Some(template) => render_template(template, text),
            None => {
                let conversation_id = self
                    .state
                    .session_id()
                    .unwrap_or_else(|| self.conversation_id.clone());
                Ok(default_body(text, &conversation_id))
            }
        }
    }

    /// Blocking JSON exchange: one completion, no chunks.
    async fn run_json(
        &self,
        init: &Initialized,
        token: CancellationToken,
        request: RequestBuilder,
        callbacks: &mut dyn ChatCallbacks,
    ) -> SendOutcome {
        let config = &init.config;
        let splitter = ReasoningSplitter::with_markers(config.thinking_markers.clone());
        let mut sink = ResponseSink::new(callbacks, token, splitter);

        let exchange = async {
            let response = send_request(request, config.timeout(), &mut sink).await?;
            read_body(response, config.timeout(), &mut sink).await
        };
        let Some(body) = exchange.instrument(send_span()).await else {
            return sink.outcome();
        };

        let text = match serde_json::from_str::<Value>(&body) {
            Ok(value) => extract_response_text(&value, config.message_path_in_response.as_deref()),
            Err(err) => {
                warn!(error = %err, "Langchain response is not JSON; using raw body");
                body
            }
        };
        sink.complete_with(Some(&text));
        sink.outcome()
    }
}

#[async_trait]
impl ChatAdapter for LangchainAdapter {
    fn framework(&self) -> Framework {
        Framework::Langchain
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
        let config = &init.config;
        let token = guard.token().clone();

        let outcome = match self.variant {
            AdapterVariant::Direct => {
                let text = format_history_prompt(history, &message.content);
                let body = self.direct_body(config, &text)?;
                let url = config.base_url();
                debug!(%url, format = ?config.response_format, "sending Langchain message");

                let builder = init.post(url).json(&body);
                match config.response_format {
                    ResponseFormat::Sse => {
                        run_sse(&self.state, &init, token, builder, LangchainHandler, callbacks)
                            .await
                    }
                    ResponseFormat::Json => self.run_json(&init, token, builder, callbacks).await,
                }
            }
            AdapterVariant::Hub => {
                let mut messages = history.to_vec();
                messages.push(ConversationMessage::user(message.content));
                let request = LangchainHubRequest {
                    framework: Framework::Langchain.wire_tag(),
                    agent_id: config.require_agent_id("Langchain hub adapter")?.to_string(),
                    session_id: self.state.session_id(),
                    messages,
                };
                let url = hub_url(config.base_url());
                debug!(%url, "sending Langchain message via hub");

                let builder = init.post(&url).json(&request);
                let handler = HubHandler::new(LangchainHandler);
                run_sse(&self.state, &init, token, builder, handler, callbacks).await
            }
        };
        Ok(outcome)
    }

    fn cancel(&self) {
        if self.state.lifecycle.cancel() {
            debug!("Langchain send cancelled");
        }
    }

    fn dispose(&self) {
        self.state.dispose();
    }

    fn supports_streaming(&self) -> bool {
        match self.variant {
            AdapterVariant::Hub => true,
            AdapterVariant::Direct => self
                .state
                .snapshot()
                .map_or(true, |init| init.config.response_format == ResponseFormat::Sse),
        }
    }

    fn session_id(&self) -> Option<String> {
        self.state.session_id()
    }
}

/// Tolerant event mapping: any recognizable text is content, unparsable
/// payloads are raw text, other JSON is telemetry.
#[derive(Debug)]
struct LangchainHandler;

impl PayloadHandler for LangchainHandler {
    fn handle(&mut self, payload: SsePayload, sink: &mut ResponseSink<'_>) {
        let value = match payload {
            SsePayload::Json(value) => value,
            SsePayload::Text(text) => {
                sink.push_content(&text);
                return;
            }
            SsePayload::Done => return,
        };

        if let Some(text) = extract_stream_content(&value) {
            sink.push_content(&text);
            return;
        }

        let tag = value
            .get("event")
            .or_else(|| value.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("langchain_event")
            .to_string();
        sink.system_event(tag, value);
    }
}
