//! The unified chat adapter contract.
//!
//! Every framework adapter, direct or hub-proxied, implements [`ChatAdapter`].
//! Callers pick one through the [`AdapterFactory`](crate::AdapterFactory),
//! initialize it once, and then send messages one at a time.

use async_trait::async_trait;
use hubchat_core::{
    AdapterConfig, AdapterResult, AdapterVariant, ChatMessage, ConversationMessage, Framework,
};
use std::sync::Arc;

use crate::callbacks::ChatCallbacks;

/// How a send ended, mirroring which terminal callback fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// `on_complete` fired.
    Completed,
    /// `on_error` fired.
    Failed,
    /// The caller cancelled; no terminal callback fired.
    Cancelled,
}

/// Common interface of all framework adapters.
///
/// All methods take `&self`, so an adapter held in an [`Arc`] can be cancelled
/// from another task while a send is running. At most one send may be in
/// flight per instance; a concurrent second send fails with
/// [`AdapterError::Busy`](hubchat_core::AdapterError::Busy).
#[async_trait]
pub trait ChatAdapter: Send + Sync + std::fmt::Debug {
    /// Framework this adapter speaks.
    fn framework(&self) -> Framework;

    /// Direct or hub-proxied.
    fn variant(&self) -> AdapterVariant;

    /// Validate and store the configuration, resetting all prior state.
    fn initialize(&self, config: AdapterConfig) -> AdapterResult<()>;

    /// Send one message with its conversation context.
    ///
    /// Returns `Err` only for problems detected before any network call
    /// (missing configuration, a send already in flight). Everything after
    /// that is reported through `callbacks`.
    async fn send_message(
        &self,
        message: ChatMessage,
        callbacks: &mut dyn ChatCallbacks,
        history: &[ConversationMessage],
    ) -> AdapterResult<SendOutcome>;

    /// Abort the in-flight send, if any. Idempotent.
    fn cancel(&self);

    /// Cancel and drop configuration and session state.
    ///
    /// The adapter must be initialized again before the next send.
    fn dispose(&self);

    /// Whether responses arrive incrementally.
    fn supports_streaming(&self) -> bool;

    /// Server-held session id tracked by this adapter, if any.
    fn session_id(&self) -> Option<String> {
        None
    }
}

/// Shared adapter for dynamic dispatch.
pub type BoxedAdapter = Arc<dyn ChatAdapter>;
