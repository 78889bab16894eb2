//! # hubchat-streaming
//!
//! Stream-processing building blocks shared by every hubchat adapter.
//!
//! - **[`LineDecoder`]** / **[`SseLineStream`]**: turn raw response bytes into
//!   complete `data:` payloads, surviving arbitrary fragment boundaries
//! - **[`SsePayload`]**: classify a payload as `[DONE]`, JSON, or raw text
//! - **[`ReasoningSplitter`]**: separate answer text from inline reasoning
//!
//! ## Example
//!
//! ```rust
//! use hubchat_streaming::{LineDecoder, ReasoningSplitter, SsePayload};
//!
//! let mut decoder = LineDecoder::new();
//! let mut splitter = ReasoningSplitter::new();
//!
//! for fragment in [&b"data: \"A<thi"[..], &b"nk>B</think>C\"\n"[..]] {
//!     for payload in decoder.feed(fragment).unwrap() {
//!         if let SsePayload::Json(serde_json::Value::String(text)) = SsePayload::classify(&payload) {
//!             splitter.process_chunk(&text);
//!         }
//!     }
//! }
//!
//! assert_eq!(splitter.answer(), "AC");
//! assert_eq!(splitter.reasoning(), "B");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod splitter;
pub mod sse;

pub use error::{StreamError, StreamResult};
pub use splitter::{ReasoningSplitter, SplitMode, SplitState};
pub use sse::{LineDecoder, SseLineStream, SsePayload, DONE_SENTINEL};
