//! One-call helpers on top of the callback contract.
//!
//! [`chat_request`] waits for the final response. [`chat_stream`] runs the
//! send on a background task and yields its callbacks as a [`Stream`] of
//! [`ChatEvent`]s. [`chat_request_sync`] blocks, for scripts without a runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use hubchat::direct::{chat_stream, ChatEvent};
//! use hubchat::prelude::*;
//!
//! # async fn run() -> AdapterResult<()> {
//! let adapter = AdapterFactory::create_adapter(Framework::Langchain)?;
//! adapter.initialize(AdapterConfig::new("http://localhost:8000/chat/stream"))?;
//!
//! let mut events = chat_stream(adapter.into(), ChatMessage::new("Hello"), Vec::new());
//! while let Some(event) = events.next().await {
//!     if let ChatEvent::Chunk(chunk) = event {
//!         println!("{}", chunk.content);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use futures::Stream;
use hubchat_adapters::{
    AdapterFactory, BoxedAdapter, ChatAdapter, ChatCallbacks, CollectingCallbacks, SendOutcome,
};
use hubchat_core::{
    AdapterConfig, AdapterError, AdapterResult, AdapterVariant, ChatMessage, ChatResponse,
    ChatResponseChunk, ConversationMessage, SystemEvent,
};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::debug;

// ============================================================================
// Blocking Requests
// ============================================================================

/// Send one message and wait for the final response.
///
/// Chunks and system events are discarded. A cancelled send yields
/// [`AdapterError::Cancelled`].
pub async fn chat_request(
    adapter: &dyn ChatAdapter,
    message: ChatMessage,
    history: &[ConversationMessage],
) -> AdapterResult<ChatResponse> {
    let mut callbacks = CollectingCallbacks::new();
    let outcome = adapter.send_message(message, &mut callbacks, history).await?;

    match outcome {
        SendOutcome::Completed => callbacks
            .completions
            .pop()
            .ok_or_else(|| AdapterError::protocol("send completed without a response")),
        SendOutcome::Failed => Err(callbacks
            .errors
            .pop()
            .unwrap_or_else(|| AdapterError::protocol("send failed without an error"))),
        SendOutcome::Cancelled => Err(AdapterError::Cancelled),
    }
}

/// Blocking variant of [`chat_request`] that builds the adapter itself.
///
/// Creates a current-thread runtime per call. Fails when called from inside
/// an async context; use [`chat_request`] there.
pub fn chat_request_sync(
    framework: &str,
    variant: AdapterVariant,
    config: AdapterConfig,
    message: ChatMessage,
    history: &[ConversationMessage],
) -> AdapterResult<ChatResponse> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(AdapterError::configuration(
            "chat_request_sync cannot be called from an async context; use chat_request",
        ));
    }

    let adapter = AdapterFactory::create(framework, variant)?;
    adapter.initialize(config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AdapterError::configuration(format!("failed to create runtime: {e}")))?;

    runtime.block_on(chat_request(adapter.as_ref(), message, history))
}

// ============================================================================
// Streaming Requests
// ============================================================================

/// One callback of a send, as a value.
#[derive(Debug)]
pub enum ChatEvent {
    /// Cumulative content so far.
    Chunk(ChatResponseChunk),
    /// Tool-call or lifecycle telemetry.
    SystemEvent(SystemEvent),
    /// Backend-assigned session id.
    SessionId(String),
    /// Final response; the stream ends after it.
    Complete(ChatResponse),
    /// Failure, including errors raised before the request was sent; the stream ends after it.
    Error(AdapterError),
}

impl ChatEvent {
    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Complete(_) | ChatEvent::Error(_))
    }
}

struct ChannelCallbacks {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelCallbacks {
    fn send(&self, event: ChatEvent) {
        // The receiver may be gone; the send still runs to its end.
        let _ = self.tx.send(event);
    }
}

impl ChatCallbacks for ChannelCallbacks {
    fn on_chunk(&mut self, chunk: ChatResponseChunk) {
        self.send(ChatEvent::Chunk(chunk));
    }

    fn on_complete(&mut self, response: ChatResponse) {
        self.send(ChatEvent::Complete(response));
    }

    fn on_error(&mut self, error: AdapterError) {
        self.send(ChatEvent::Error(error));
    }

    fn on_system_event(&mut self, event: SystemEvent) {
        self.send(ChatEvent::SystemEvent(event));
    }

    fn on_session_id(&mut self, session_id: &str) {
        self.send(ChatEvent::SessionId(session_id.to_string()));
    }
}

/// Events of one background send.
///
/// Ends after the terminal event, or without one if the send was cancelled.
/// Dropping the stream does not cancel the send; call
/// [`ChatAdapter::cancel`] on the adapter for that.
#[derive(Debug)]
pub struct ChatEventStream {
    rx: mpsc::UnboundedReceiver<ChatEvent>,
}

impl Stream for ChatEventStream {
    type Item = ChatEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Run a send on a background task and stream its callbacks.
///
/// Must be called within a tokio runtime.
pub fn chat_stream(
    adapter: BoxedAdapter,
    message: ChatMessage,
    history: Vec<ConversationMessage>,
) -> ChatEventStream {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut callbacks = ChannelCallbacks { tx };
        match adapter.send_message(message, &mut callbacks, &history).await {
            Ok(outcome) => debug!(?outcome, "background send finished"),
            Err(err) => callbacks.on_error(err),
        }
    });

    ChatEventStream { rx }
}
