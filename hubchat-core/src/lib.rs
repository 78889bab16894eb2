//! # hubchat-core
//!
//! Core types, configuration, and error handling for hubchat.
//!
//! This crate provides the foundational types shared by the streaming layer
//! and the framework adapters:
//!
//! - **Messages**: outbound messages, history, chunks, responses, system events
//! - **Framework**: the supported agent backends
//! - **Config**: per-adapter connection parameters
//! - **Errors**: configuration, transport, protocol, and cancellation errors
//!
//! ## Example
//!
//! ```rust
//! use hubchat_core::{AdapterConfig, ChatMessage, ConversationMessage, Framework, SelectedResource};
//!
//! let framework: Framework = "Agno".parse().unwrap();
//! let config = AdapterConfig::new("http://localhost:7777")
//!     .with_selected_resource(SelectedResource::team("research-team"));
//! config.validate().unwrap();
//!
//! let history = vec![ConversationMessage::user("hi"), ConversationMessage::assistant("hello")];
//! let message = ChatMessage::new("What changed since yesterday?");
//! # let _ = (framework, history, message);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod framework;
pub mod identifier;
pub mod messages;

pub use config::{
    AdapterConfig, ResourceKind, ResponseFormat, SelectedResource, ThinkingMarkers,
};
pub use errors::{AdapterError, AdapterResult};
pub use framework::{AdapterVariant, Framework};
pub use identifier::now_utc;
pub use messages::{
    format_history_prompt, ChatMessage, ChatResponse, ChatResponseChunk, ConversationMessage,
    Role, SystemEvent,
};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::config::{AdapterConfig, ResourceKind, ResponseFormat, SelectedResource};
    pub use crate::errors::{AdapterError, AdapterResult};
    pub use crate::framework::{AdapterVariant, Framework};
    pub use crate::messages::{
        ChatMessage, ChatResponse, ChatResponseChunk, ConversationMessage, Role, SystemEvent,
    };
}
