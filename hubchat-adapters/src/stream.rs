//! Request/response driving shared by all adapters.
//!
//! Every await here races against the send's cancellation token, biased
//! towards cancellation, so a cancelled send stops at the next I/O boundary
//! without delivering further callbacks.

use futures::StreamExt;
use hubchat_core::identifier::generate_send_id;
use hubchat_core::AdapterError;
use hubchat_streaming::{ReasoningSplitter, SseLineStream, SsePayload};
use reqwest::{RequestBuilder, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, trace, Instrument, Span};

use crate::adapter::SendOutcome;
use crate::callbacks::ChatCallbacks;
use crate::sink::ResponseSink;
use crate::state::{AdapterState, Initialized};

/// Protocol-specific handling of decoded SSE payloads.
///
/// `[DONE]` never reaches the handler; the driver finalizes on it.
pub(crate) trait PayloadHandler {
    fn handle(&mut self, payload: SsePayload, sink: &mut ResponseSink<'_>);
}

/// Run one streaming exchange end to end and report how it ended.
///
/// A session id picked up from the stream is stored on `state` for the next send.
pub(crate) async fn run_sse<H: PayloadHandler + Send>(
    state: &AdapterState,
    init: &Initialized,
    token: CancellationToken,
    request: RequestBuilder,
    mut handler: H,
    callbacks: &mut dyn ChatCallbacks,
) -> SendOutcome {
    let known = state.session_id();
    let splitter = ReasoningSplitter::with_markers(init.config.thinking_markers.clone());
    let mut sink = ResponseSink::new(callbacks, token, splitter).with_known_session(known.clone());

    let exchange = async {
        if let Some(response) = send_request(request, init.config.timeout(), &mut sink).await {
            drive_sse(response, &mut sink, &mut handler).await;
        }
    };
    exchange.instrument(send_span()).await;

    if let Some(id) = sink.session_id().filter(|id| known.as_deref() != Some(*id)) {
        state.set_session_id(id.to_string());
    }
    sink.outcome()
}

/// Span correlating the log lines of one send.
pub(crate) fn send_span() -> Span {
    debug_span!("send", send_id = %generate_send_id())
}

/// Send the request and check the status.
///
/// Returns `None` when the send is over already: cancelled, or failed with
/// the error delivered through the sink.
pub(crate) async fn send_request(
    request: RequestBuilder,
    timeout: Duration,
    sink: &mut ResponseSink<'_>,
) -> Option<Response> {
    let token = sink.token().clone();

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => {
            debug!("send cancelled before response headers");
            return None;
        }
        result = request.send() => result,
    };

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            sink.fail(transport_error(err, timeout));
            return None;
        }
    };

    if response.status().is_success() {
        return Some(response);
    }

    let status = response.status().as_u16();
    let body = tokio::select! {
        biased;
        _ = token.cancelled() => return None,
        body = response.text() => body.unwrap_or_default(),
    };
    sink.fail(AdapterError::http(status, body));
    None
}

/// Read a complete (non-streaming) body, honoring cancellation.
pub(crate) async fn read_body(
    response: Response,
    timeout: Duration,
    sink: &mut ResponseSink<'_>,
) -> Option<String> {
    let token = sink.token().clone();
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return None,
        body = response.text() => body,
    };
    match result {
        Ok(body) => Some(body),
        Err(err) => {
            sink.fail(transport_error(err, timeout));
            None
        }
    }
}

/// Decode an SSE body and dispatch every payload until a terminal event,
/// `[DONE]`, cancellation, or the end of the transport.
pub(crate) async fn drive_sse<H: PayloadHandler>(
    response: Response,
    sink: &mut ResponseSink<'_>,
    handler: &mut H,
) {
    let token = sink.token().clone();
    let mut payloads = std::pin::pin!(SseLineStream::new(response.bytes_stream()));

    while !sink.is_finished() {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("send cancelled mid-stream");
                return;
            }
            next = payloads.next() => next,
        };

        match next {
            Some(Ok(payload)) => {
                trace!(%payload, "sse payload");
                match SsePayload::classify(&payload) {
                    SsePayload::Done => {
                        debug!("received [DONE]");
                        sink.finish_stream();
                    }
                    payload => handler.handle(payload, sink),
                }
            }
            Some(Err(err)) => {
                sink.fail(err.into());
                return;
            }
            None => {
                debug!("stream ended");
                sink.finish_stream();
            }
        }
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> AdapterError {
    AdapterError::from_reqwest(err, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn timed_out_request(timeout: Duration) -> reqwest::Error {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;
        let client = reqwest::Client::builder().timeout(timeout).build().unwrap();
        client.post(server.uri()).send().await.unwrap_err()
    }

    #[tokio::test]
    async fn test_timeout_reports_configured_duration() {
        let timeout = Duration::from_millis(50);
        let err = transport_error(timed_out_request(timeout).await, timeout);
        assert!(matches!(err, AdapterError::Timeout(Some(d)) if d == timeout));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_plain_conversion_has_no_duration() {
        let err = AdapterError::from(timed_out_request(Duration::from_millis(50)).await);
        assert!(matches!(err, AdapterError::Timeout(None)));
    }
}
