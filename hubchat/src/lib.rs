//! # hubchat - Streaming chat adapters for agent frameworks
//!
//! hubchat talks to agent backends (Google ADK, Agno, Langchain) either
//! directly or through a hub gateway, and reports every reply through one
//! callback contract: cumulative chunks with reasoning split from the answer,
//! system events for tool calls and lifecycle telemetry, the backend session
//! id, and exactly one terminal `on_complete` or `on_error`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hubchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     hubchat::telemetry::init_tracing();
//!
//!     let adapter = AdapterFactory::create_adapter(Framework::Agno)?;
//!     adapter.initialize(
//!         AdapterConfig::new("http://localhost:7777")
//!             .with_selected_resource(SelectedResource::team("research")),
//!     )?;
//!
//!     let mut callbacks = FnCallbacks::new()
//!         .with_chunk(|chunk| println!("{}", chunk.content))
//!         .with_error(|err| eprintln!("error: {err}"));
//!     adapter
//!         .send_message(ChatMessage::new("What changed today?"), &mut callbacks, &[])
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `adk` | Google ADK adapter | ✅ |
//! | `agno` | Agno teams and agents | ✅ |
//! | `langchain` | Langchain / LangServe endpoints | ✅ |
//!
//! ## Architecture
//!
//! - [`hubchat_core`] - messages, configuration, errors
//! - [`hubchat_streaming`] - SSE decoding and the reasoning splitter
//! - [`hubchat_adapters`] - the adapters, factory, and lifecycle

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Convenience Layers
// ============================================================================

pub mod direct;
pub mod telemetry;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Messages, configuration, and error handling.
pub use hubchat_core as core;

/// SSE decoding and reasoning/answer splitting.
pub use hubchat_streaming as streaming;

/// Framework adapters and the factory.
pub use hubchat_adapters as adapters;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use hubchat_core::{
    format_history_prompt, AdapterConfig, AdapterError, AdapterResult, AdapterVariant,
    ChatMessage, ChatResponse, ChatResponseChunk, ConversationMessage, Framework, ResourceKind,
    ResponseFormat, Role, SelectedResource, SystemEvent, ThinkingMarkers,
};

pub use hubchat_streaming::{ReasoningSplitter, SseLineStream, SsePayload};

pub use hubchat_adapters::{
    AdapterFactory, BoxedAdapter, ChatAdapter, ChatCallbacks, CollectingCallbacks, FnCallbacks,
    SendOutcome,
};

#[cfg(feature = "adk")]
#[cfg_attr(docsrs, doc(cfg(feature = "adk")))]
pub use hubchat_adapters::AdkAdapter;

#[cfg(feature = "agno")]
#[cfg_attr(docsrs, doc(cfg(feature = "agno")))]
pub use hubchat_adapters::AgnoAdapter;

#[cfg(feature = "langchain")]
#[cfg_attr(docsrs, doc(cfg(feature = "langchain")))]
pub use hubchat_adapters::LangchainAdapter;

pub use direct::{chat_request, chat_request_sync, chat_stream, ChatEvent, ChatEventStream};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```rust
/// use hubchat::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::prelude::*;

    // Adapters
    pub use crate::adapters::{
        AdapterFactory, BoxedAdapter, ChatAdapter, ChatCallbacks, CollectingCallbacks,
        FnCallbacks, SendOutcome,
    };

    // Direct access
    pub use crate::direct::{chat_request, chat_stream, ChatEvent};
}

/// Version of the hubchat facade.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
