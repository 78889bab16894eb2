//! Callback interface through which adapters deliver a response.
//!
//! Callbacks are invoked synchronously from the decode loop, in arrival order.
//! They should return quickly: a slow callback stalls the stream.

use hubchat_core::{AdapterError, ChatResponse, ChatResponseChunk, SystemEvent};
use std::fmt;

/// Receiver of one send's output.
///
/// Exactly one of [`on_complete`](Self::on_complete) or [`on_error`](Self::on_error)
/// fires per send, unless the send was cancelled, in which case neither does.
pub trait ChatCallbacks: Send {
    /// Cumulative answer (and reasoning) so far.
    fn on_chunk(&mut self, chunk: ChatResponseChunk);

    /// The send finished successfully.
    fn on_complete(&mut self, response: ChatResponse);

    /// The send failed.
    fn on_error(&mut self, error: AdapterError);

    /// Tool-call or lifecycle telemetry outside the visible answer.
    fn on_system_event(&mut self, _event: SystemEvent) {}

    /// The backend assigned or confirmed a session id.
    fn on_session_id(&mut self, _session_id: &str) {}
}

type ChunkFn = Box<dyn FnMut(ChatResponseChunk) + Send>;
type CompleteFn = Box<dyn FnMut(ChatResponse) + Send>;
type ErrorFn = Box<dyn FnMut(AdapterError) + Send>;
type SystemEventFn = Box<dyn FnMut(SystemEvent) + Send>;
type SessionIdFn = Box<dyn FnMut(&str) + Send>;

/// Closure-backed callbacks. Unset handlers do nothing.
///
/// ```rust
/// use hubchat_adapters::FnCallbacks;
///
/// let callbacks = FnCallbacks::new()
///     .with_chunk(|chunk| print!("\r{}", chunk.content))
///     .with_complete(|response| println!("\n{}", response.content))
///     .with_error(|error| eprintln!("{error}"));
/// # let _ = callbacks;
/// ```
#[derive(Default)]
pub struct FnCallbacks {
    chunk: Option<ChunkFn>,
    complete: Option<CompleteFn>,
    error: Option<ErrorFn>,
    system_event: Option<SystemEventFn>,
    session_id: Option<SessionIdFn>,
}

impl FnCallbacks {
    /// Create callbacks with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk handler.
    #[must_use]
    pub fn with_chunk(mut self, f: impl FnMut(ChatResponseChunk) + Send + 'static) -> Self {
        self.chunk = Some(Box::new(f));
        self
    }

    /// Set the completion handler.
    #[must_use]
    pub fn with_complete(mut self, f: impl FnMut(ChatResponse) + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }

    /// Set the error handler.
    #[must_use]
    pub fn with_error(mut self, f: impl FnMut(AdapterError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Set the system event handler.
    #[must_use]
    pub fn with_system_event(mut self, f: impl FnMut(SystemEvent) + Send + 'static) -> Self {
        self.system_event = Some(Box::new(f));
        self
    }

    /// Set the session id handler.
    #[must_use]
    pub fn with_session_id(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.session_id = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for FnCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCallbacks")
            .field("chunk", &self.chunk.is_some())
            .field("complete", &self.complete.is_some())
            .field("error", &self.error.is_some())
            .field("system_event", &self.system_event.is_some())
            .field("session_id", &self.session_id.is_some())
            .finish()
    }
}

impl ChatCallbacks for FnCallbacks {
    fn on_chunk(&mut self, chunk: ChatResponseChunk) {
        if let Some(f) = self.chunk.as_mut() {
            f(chunk);
        }
    }

    fn on_complete(&mut self, response: ChatResponse) {
        if let Some(f) = self.complete.as_mut() {
            f(response);
        }
    }

    fn on_error(&mut self, error: AdapterError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }

    fn on_system_event(&mut self, event: SystemEvent) {
        if let Some(f) = self.system_event.as_mut() {
            f(event);
        }
    }

    fn on_session_id(&mut self, session_id: &str) {
        if let Some(f) = self.session_id.as_mut() {
            f(session_id);
        }
    }
}

/// Callbacks that record everything they receive.
///
/// Handy for non-interactive callers and for tests.
#[derive(Debug, Default)]
pub struct CollectingCallbacks {
    /// Every chunk, in order.
    pub chunks: Vec<ChatResponseChunk>,
    /// Every completion (at most one for a well-behaved adapter).
    pub completions: Vec<ChatResponse>,
    /// Every error (at most one for a well-behaved adapter).
    pub errors: Vec<AdapterError>,
    /// Every system event, in order.
    pub system_events: Vec<SystemEvent>,
    /// Every surfaced session id, in order.
    pub session_ids: Vec<String>,
}

impl CollectingCallbacks {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The completed response, if exactly one completion fired.
    #[must_use]
    pub fn response(&self) -> Option<&ChatResponse> {
        match self.completions.as_slice() {
            [response] => Some(response),
            _ => None,
        }
    }

    /// Number of terminal callbacks that fired.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.completions.len() + self.errors.len()
    }

    /// Tags of the recorded system events.
    #[must_use]
    pub fn system_event_names(&self) -> Vec<&str> {
        self.system_events.iter().map(|e| e.event.as_str()).collect()
    }
}

impl ChatCallbacks for CollectingCallbacks {
    fn on_chunk(&mut self, chunk: ChatResponseChunk) {
        self.chunks.push(chunk);
    }

    fn on_complete(&mut self, response: ChatResponse) {
        self.completions.push(response);
    }

    fn on_error(&mut self, error: AdapterError) {
        self.errors.push(error);
    }

    fn on_system_event(&mut self, event: SystemEvent) {
        self.system_events.push(event);
    }

    fn on_session_id(&mut self, session_id: &str) {
        self.session_ids.push(session_id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_fn_callbacks_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chunk_seen = Arc::clone(&seen);
        let complete_seen = Arc::clone(&seen);

        let mut callbacks = FnCallbacks::new()
            .with_chunk(move |chunk| chunk_seen.lock().unwrap().push(chunk.content))
            .with_complete(move |response| complete_seen.lock().unwrap().push(response.content));

        callbacks.on_chunk(ChatResponseChunk::new("a", ""));
        callbacks.on_complete(ChatResponse::new("ab", ""));
        // No handler set: ignored.
        callbacks.on_error(AdapterError::Cancelled);
        callbacks.on_session_id("s1");

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "ab".to_string()]);
    }

    #[test]
    fn test_fn_callbacks_session_and_system_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let session_seen = Arc::clone(&seen);
        let event_seen = Arc::clone(&seen);
        let error_seen = Arc::clone(&seen);

        let mut callbacks = FnCallbacks::new()
            .with_session_id(move |id| session_seen.lock().unwrap().push(format!("session:{id}")))
            .with_system_event(move |event| event_seen.lock().unwrap().push(event.event))
            .with_error(move |error| error_seen.lock().unwrap().push(error.to_string()));

        callbacks.on_session_id("s1");
        callbacks.on_system_event(SystemEvent::new("ToolCallStarted", serde_json::json!({})));
        callbacks.on_error(AdapterError::Cancelled);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "session:s1".to_string(),
                "ToolCallStarted".to_string(),
                "Request cancelled".to_string(),
            ]
        );
    }

    #[test]
    fn test_collecting_callbacks() {
        let mut callbacks = CollectingCallbacks::new();
        callbacks.on_system_event(SystemEvent::new("ToolCallStarted", serde_json::json!({})));
        callbacks.on_complete(ChatResponse::new("done", ""));

        assert_eq!(callbacks.terminal_count(), 1);
        assert_eq!(callbacks.response().unwrap().content, "done");
        assert_eq!(callbacks.system_event_names(), vec!["ToolCallStarted"]);
    }
}
