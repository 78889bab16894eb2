//! Line-buffered Server-Sent Events decoding.
//!
//! Backends stream one event per `data:` line. [`LineDecoder`] turns raw
//! transport fragments into complete payload strings, carrying partial lines
//! and partial UTF-8 sequences over to the next fragment. [`SseLineStream`]
//! wraps a byte stream with the decoder, and [`SsePayload`] classifies a
//! payload before any protocol-specific handling.

use crate::error::{StreamError, StreamResult};
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

/// Sentinel some backends send as the last payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder from byte fragments to `data:` payloads.
#[derive(Debug)]
pub struct LineDecoder {
    tail: String,
    partial_utf8: Vec<u8>,
    max_line_size: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self {
            tail: String::new(),
            partial_utf8: Vec::new(),
            max_line_size: MAX_LINE_SIZE,
        }
    }
}

impl LineDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the maximum size of an unterminated line.
    #[must_use]
    pub fn with_max_line_size(mut self, max: usize) -> Self {
        self.max_line_size = max;
        self
    }

    /// Feed a byte fragment; returns the payloads of every line it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<Vec<String>> {
        let text = self.decode_utf8(bytes);
        self.feed_str(&text)
    }

    /// Feed an already-decoded text fragment.
    pub fn feed_str(&mut self, s: &str) -> StreamResult<Vec<String>> {
        self.tail.push_str(s);

        let Some(last_newline) = self.tail.rfind('\n') else {
            if self.tail.len() > self.max_line_size {
                return Err(StreamError::BufferOverflow(self.max_line_size));
            }
            return Ok(Vec::new());
        };

        let rest = self.tail.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.tail, rest);

        let payloads = complete
            .split('\n')
            .filter_map(|line| data_payload(line.strip_suffix('\r').unwrap_or(line)))
            .map(str::to_string)
            .collect();

        if self.tail.len() > self.max_line_size {
            return Err(StreamError::BufferOverflow(self.max_line_size));
        }

        Ok(payloads)
    }

    /// Signal end of data. An unterminated trailing line is dropped.
    pub fn finish(&mut self) {
        if !self.tail.is_empty() || !self.partial_utf8.is_empty() {
            tracing::debug!(
                tail_len = self.tail.len(),
                partial_bytes = self.partial_utf8.len(),
                "Discarding unterminated trailing line"
            );
        }
        self.clear();
    }

    /// Text carried over from the last fragment.
    #[must_use]
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Reset all carried state.
    pub fn clear(&mut self) {
        self.tail.clear();
        self.partial_utf8.clear();
    }

    /// Decode bytes, holding back an incomplete trailing UTF-8 sequence.
    fn decode_utf8(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.partial_utf8);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        out.push_str(valid);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid_len..];
                        }
                        None => {
                            self.partial_utf8 = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }
}

/// Payload of a `data:` line, or `None` for any other line.
fn data_payload(line: &str) -> Option<&str> {
    let value = line.strip_prefix("data:")?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}

/// A decoded payload, classified before protocol handling.
#[derive(Debug, Clone, PartialEq)]
pub enum SsePayload {
    /// The `[DONE]` end-of-stream sentinel.
    Done,
    /// A JSON value.
    Json(Value),
    /// Text that is not valid JSON; treated as raw content by tolerant protocols.
    Text(String),
}

impl SsePayload {
    /// Classify a payload. The sentinel is checked before JSON parsing.
    #[must_use]
    pub fn classify(payload: &str) -> Self {
        if payload.trim() == DONE_SENTINEL {
            return SsePayload::Done;
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => SsePayload::Json(value),
            Err(_) => SsePayload::Text(payload.to_string()),
        }
    }

    /// Whether this is the end-of-stream sentinel.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, SsePayload::Done)
    }
}

pin_project! {
    /// Stream adapter that yields `data:` payloads from a byte stream.
    pub struct SseLineStream<S> {
        #[pin]
        inner: S,
        decoder: LineDecoder,
        pending: VecDeque<String>,
        finished: bool,
    }
}

impl<S> SseLineStream<S> {
    /// Create a new payload stream from a byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: LineDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

impl<S, E> Stream for SseLineStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    type Item = StreamResult<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(payload) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(payload)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => match this.decoder.feed(&bytes) {
                    Ok(payloads) => this.pending.extend(payloads),
                    Err(err) => {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(err)));
                    }
                },
                Poll::Ready(Some(Err(err))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(StreamError::transport(err))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    this.decoder.finish();
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
