//! # hubchat-adapters
//!
//! Framework adapters behind one streaming chat contract.
//!
//! Each adapter turns a framework's wire protocol into the same sequence of
//! callbacks: cumulative [`ChatResponseChunk`](hubchat_core::ChatResponseChunk)s,
//! system events for tool calls and lifecycle telemetry, and exactly one of
//! `on_complete` / `on_error` (none when the caller cancels).
//!
//! | Framework | Direct | Hub |
//! |-----------|--------|-----|
//! | ADK | workbench gateway, JSON body | hub gateway |
//! | Agno | `/{teams,agents}/{id}/runs`, multipart | hub gateway |
//! | Langchain | configured endpoint, templated body, SSE or JSON | hub gateway |
//!
//! ## Example
//!
//! ```rust,no_run
//! use hubchat_adapters::{AdapterFactory, CollectingCallbacks};
//! use hubchat_core::{AdapterConfig, ChatMessage, Framework, SelectedResource};
//!
//! # async fn run() -> hubchat_core::AdapterResult<()> {
//! let adapter = AdapterFactory::create_adapter(Framework::Agno)?;
//! adapter.initialize(
//!     AdapterConfig::new("http://localhost:7777")
//!         .with_selected_resource(SelectedResource::team("research")),
//! )?;
//!
//! let mut callbacks = CollectingCallbacks::new();
//! adapter
//!     .send_message(ChatMessage::new("Summarize today's incidents"), &mut callbacks, &[])
//!     .await?;
//! println!("{:?}", callbacks.response());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod callbacks;
pub mod factory;
pub mod hub;
pub mod lifecycle;

mod sink;
mod state;
mod stream;

#[cfg(feature = "adk")]
pub mod adk;
#[cfg(feature = "agno")]
pub mod agno;
#[cfg(feature = "langchain")]
pub mod langchain;

pub use adapter::{BoxedAdapter, ChatAdapter, SendOutcome};
pub use callbacks::{ChatCallbacks, CollectingCallbacks, FnCallbacks};
pub use factory::AdapterFactory;
pub use hub::{HubEnvelope, HUB_CHAT_PATH};
pub use lifecycle::{SendGuard, SendLifecycle};

#[cfg(feature = "adk")]
pub use adk::AdkAdapter;
#[cfg(feature = "agno")]
pub use agno::AgnoAdapter;
#[cfg(feature = "langchain")]
pub use langchain::LangchainAdapter;
