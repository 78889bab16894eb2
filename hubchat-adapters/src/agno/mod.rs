//! Agno adapter.
//!
//! An Agno server hosts several teams and agents; the selected resource picks
//! both the run endpoint and which events form the answer. In team mode the
//! team-level events are authoritative and agent-level ones (a member's
//! intermediate output) are demoted to system events. In agent mode it is the
//! other way round.

mod types;

pub use types::{AgnoEvent, AgnoEventKind, AgnoHubRequest, DEFAULT_USER_ID};

use async_trait::async_trait;
use hubchat_core::{
    format_history_prompt, AdapterConfig, AdapterError, AdapterResult, AdapterVariant,
    ChatMessage, ConversationMessage, Framework, ResourceKind, SelectedResource,
};
use hubchat_streaming::SsePayload;
use reqwest::multipart::Form;
use tracing::{debug, warn};

use crate::adapter::{ChatAdapter, SendOutcome};
use crate::callbacks::ChatCallbacks;
use crate::hub::{hub_url, HubHandler};
use crate::sink::ResponseSink;
use crate::state::AdapterState;
use crate::stream::{run_sse, PayloadHandler};

/// Adapter for Agno teams and agents.
#[derive(Debug, Default)]
pub struct AgnoAdapter {
    variant: AdapterVariant,
    state: AdapterState,
}

impl AgnoAdapter {
    /// Adapter posting directly to the Agno server's run endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter going through the hub gateway.
    #[must_use]
    pub fn hub() -> Self {
        Self {
            variant: AdapterVariant::Hub,
            state: AdapterState::default(),
        }
    }
}

fn require_resource(config: &AdapterConfig) -> AdapterResult<&SelectedResource> {
    config
        .selected_resource
        .as_ref()
        .filter(|r| !r.id.is_empty())
        .ok_or_else(|| {
            AdapterError::configuration("Agno adapter requires a selected team or agent")
        })
}

/// `{endpoint}/{teams|agents}/{id}/runs`
fn runs_url(config: &AdapterConfig, resource: &SelectedResource) -> String {
    format!(
        "{}/{}/{}/runs",
        config.base_url(),
        resource.kind.path_segment(),
        resource.id
    )
}

#[async_trait]
impl ChatAdapter for AgnoAdapter {
    fn framework(&self) -> Framework {
        Framework::Agno
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
        let resource = require_resource(config)?;
        let prompt = format_history_prompt(history, &message.content);
        let session_id = self.state.session_id();
        let handler = AgnoHandler::new(resource.kind);
        let token = guard.token().clone();

        let outcome = match self.variant {
            AdapterVariant::Direct => {
                let url = runs_url(config, resource);
                let user_id = config.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);
                debug!(%url, resource = %resource.kind, "sending Agno run");

                let mut form = Form::new()
                    .text("message", prompt)
                    .text("stream", "true")
                    .text("user_id", user_id.to_string());
                if let Some(id) = session_id {
                    form = form.text("session_id", id);
                }
                let builder = init.post(&url).multipart(form);
                run_sse(&self.state, &init, token, builder, handler, callbacks).await
            }
            AdapterVariant::Hub => {
                let request = AgnoHubRequest {
                    framework: Framework::Agno.wire_tag(),
                    agent_id: config.require_agent_id("Agno hub adapter")?.to_string(),
                    session_id,
                    content: prompt,
                    selected_resource: resource.clone(),
                };
                let url = hub_url(config.base_url());
                debug!(%url, resource = %resource.kind, "sending Agno run via hub");

                let builder = init.post(&url).json(&request);
                let handler = HubHandler::new(handler);
                run_sse(&self.state, &init, token, builder, handler, callbacks).await
            }
        };
        Ok(outcome)
    }

    fn cancel(&self) {
        if self.state.lifecycle.cancel() {
            debug!("Agno send cancelled");
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

/// Dispatches Agno events according to the resource mode.
#[derive(Debug)]
struct AgnoHandler {
    mode: ResourceKind,
}

impl AgnoHandler {
    fn new(mode: ResourceKind) -> Self {
        Self { mode }
    }

    /// Whether a terminal event at this level decides the send.
    fn is_authoritative(&self, team_level: bool) -> bool {
        match self.mode {
            ResourceKind::Team => team_level,
            ResourceKind::Agent => !team_level,
        }
    }

    fn dispatch(&self, event: AgnoEvent, sink: &mut ResponseSink<'_>) {
        use AgnoEventKind as K;

        if let Some(id) = event.session_id.as_deref() {
            sink.surface_session_id(id);
        }

        match event.kind.clone() {
            K::TeamRunContent => {
                if let Some(content) = &event.content {
                    sink.push_content(content);
                }
            }
            K::RunContent => {
                if self.mode == ResourceKind::Team {
                    forward(event, sink);
                } else if let Some(content) = &event.content {
                    sink.push_content(content);
                }
            }
            kind @ (K::TeamRunCompleted | K::RunCompleted) => {
                if self.is_authoritative(kind == K::TeamRunCompleted) {
                    sink.complete_with(event.content.as_deref());
                } else {
                    forward(event, sink);
                }
            }
            kind @ (K::TeamRunError | K::RunError) => {
                if self.is_authoritative(kind == K::TeamRunError) {
                    sink.fail(AdapterError::backend(event.error_message()));
                } else {
                    forward(event, sink);
                }
            }
            kind @ (K::TeamRunCancelled | K::RunCancelled) => {
                if self.is_authoritative(kind == K::TeamRunCancelled) {
                    debug!(event = %kind, "run cancelled by server");
                    sink.complete();
                } else {
                    forward(event, sink);
                }
            }
            K::TeamRunStarted
            | K::TeamToolCallStarted
            | K::TeamToolCallCompleted
            | K::TeamReasoningStarted
            | K::TeamReasoningStep
            | K::TeamReasoningCompleted
            | K::TeamMemoryUpdateStarted
            | K::TeamMemoryUpdateCompleted
            | K::RunStarted
            | K::ToolCallStarted
            | K::ToolCallCompleted
            | K::ReasoningStarted
            | K::ReasoningStep
            | K::ReasoningCompleted
            | K::MemoryUpdateStarted
            | K::MemoryUpdateCompleted
            | K::Other(_) => forward(event, sink),
        }
    }
}

fn forward(event: AgnoEvent, sink: &mut ResponseSink<'_>) {
    sink.system_event(event.kind.as_str(), event.raw);
}

impl PayloadHandler for AgnoHandler {
    fn handle(&mut self, payload: SsePayload, sink: &mut ResponseSink<'_>) {
        match payload {
            SsePayload::Json(value) => match AgnoEvent::decode(value) {
                Some(event) => self.dispatch(event, sink),
                None => warn!("skipping Agno payload without an event tag"),
            },
            SsePayload::Text(text) => warn!(payload = %text, "skipping malformed Agno event"),
            SsePayload::Done => {}
        }
    }
}
