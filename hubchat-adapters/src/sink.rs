//! Per-send response state and callback delivery.
//!
//! A [`ResponseSink`] is created at the start of every send and dropped at its
//! end, so accumulators never leak from one send into the next. It owns the
//! splitter and enforces the terminal-callback rules: at most one of
//! `on_complete` / `on_error`, and neither once the send was cancelled.

use hubchat_core::{AdapterError, SystemEvent};
use hubchat_streaming::ReasoningSplitter;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapter::SendOutcome;
use crate::callbacks::ChatCallbacks;

pub(crate) struct ResponseSink<'a> {
    callbacks: &'a mut dyn ChatCallbacks,
    token: CancellationToken,
    splitter: ReasoningSplitter,
    finished: Option<SendOutcome>,
    session_id: Option<String>,
}

impl<'a> ResponseSink<'a> {
    pub fn new(
        callbacks: &'a mut dyn ChatCallbacks,
        token: CancellationToken,
        splitter: ReasoningSplitter,
    ) -> Self {
        Self {
            callbacks,
            token,
            splitter,
            finished: None,
            session_id: None,
        }
    }

    /// Seed the session id already known to the adapter, so only changes are surfaced.
    pub fn with_known_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// No further callbacks will be delivered.
    pub fn is_finished(&self) -> bool {
        self.finished.is_some() || self.token.is_cancelled()
    }

    /// Feed text through the reasoning splitter.
    pub fn push_content(&mut self, text: &str) {
        if self.is_finished() {
            return;
        }
        if self.splitter.process_chunk(text) {
            self.emit_chunk();
        }
    }

    /// Append text to the answer verbatim, bypassing marker detection.
    pub fn push_raw(&mut self, text: &str) {
        if self.is_finished() {
            return;
        }
        if self.splitter.push_answer(text) {
            self.emit_chunk();
        }
    }

    pub fn system_event(&mut self, event: impl Into<String>, data: Value) {
        if self.is_finished() {
            return;
        }
        self.callbacks.on_system_event(SystemEvent::new(event, data));
    }

    /// Record a backend-issued session id, notifying the caller when it changed.
    pub fn surface_session_id(&mut self, session_id: &str) {
        if session_id.is_empty() || self.session_id.as_deref() == Some(session_id) {
            return;
        }
        debug!(session_id, "session id assigned");
        self.session_id = Some(session_id.to_string());
        if !self.is_finished() {
            self.callbacks.on_session_id(session_id);
        }
    }

    /// Session id seen during this send, or the one it started with.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Finalize with the accumulated content.
    pub fn complete(&mut self) {
        if self.is_finished() {
            return;
        }
        if self.splitter.finish() {
            self.emit_chunk();
            // A chunk callback may have cancelled the send.
            if self.is_finished() {
                return;
            }
        }
        self.finished = Some(SendOutcome::Completed);
        self.callbacks.on_complete(self.splitter.response());
    }

    /// Finalize, using `fallback` as the answer if nothing was streamed.
    ///
    /// The fallback is delivered in the completion only, never as a chunk.
    pub fn complete_with(&mut self, fallback: Option<&str>) {
        if self.is_finished() {
            return;
        }
        if let Some(text) = fallback.filter(|t| !t.is_empty()) {
            if self.splitter.is_empty() {
                self.splitter.process_chunk(text);
                self.splitter.finish();
            }
        }
        self.complete();
    }

    pub fn fail(&mut self, error: AdapterError) {
        if self.is_finished() {
            debug!(%error, "error after send finished; dropped");
            return;
        }
        self.finished = Some(SendOutcome::Failed);
        self.callbacks.on_error(error);
    }

    /// The transport ended. Completes unless a terminal callback already fired.
    pub fn finish_stream(&mut self) {
        self.complete();
    }

    pub fn outcome(&self) -> SendOutcome {
        match self.finished {
            Some(outcome) => outcome,
            None => SendOutcome::Cancelled,
        }
    }

    fn emit_chunk(&mut self) {
        self.callbacks.on_chunk(self.splitter.chunk());
    }
}
