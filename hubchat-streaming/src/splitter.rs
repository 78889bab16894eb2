//! Separation of answer text from inline reasoning.
//!
//! Some agents interleave their reasoning with the answer, wrapped in markers
//! such as `<think>…</think>`. [`ReasoningSplitter`] routes each span of an
//! incoming chunk to the answer or the reasoning accumulator, toggling on the
//! markers.
//!
//! A chunk may end in the middle of a marker. The splitter holds back the
//! longest suffix that could still grow into the marker it is looking for
//! (at most `marker.len() - 1` bytes) and re-examines it with the next chunk,
//! so partial markers never leak into either buffer. [`ReasoningSplitter::finish`]
//! commits whatever is still held back.

use hubchat_core::{ChatResponse, ChatResponseChunk, ThinkingMarkers};

/// Which buffer incoming text currently belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitMode {
    /// Visible answer text.
    #[default]
    Answer,
    /// Text between the opening and closing marker.
    Thinking,
}

/// Splitter state: mode plus both accumulators and the held-back lookback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitState {
    /// Current mode.
    pub mode: SplitMode,
    /// Answer text accumulated so far.
    pub answer: String,
    /// Reasoning text accumulated so far.
    pub reasoning: String,
    /// Trailing text that may be the start of a marker.
    pub pending: String,
}

impl SplitState {
    fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.mode {
            SplitMode::Answer => self.answer.push_str(text),
            SplitMode::Thinking => self.reasoning.push_str(text),
        }
    }
}

/// Stateful answer/reasoning splitter for one response.
#[derive(Debug, Clone, Default)]
pub struct ReasoningSplitter {
    markers: ThinkingMarkers,
    state: SplitState,
}

impl ReasoningSplitter {
    /// Create a splitter using `<think>` / `</think>`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter with custom markers.
    #[must_use]
    pub fn with_markers(markers: ThinkingMarkers) -> Self {
        Self {
            markers,
            state: SplitState::default(),
        }
    }

    /// Route a raw chunk into the accumulators.
    ///
    /// Returns `true` when either accumulator grew.
    pub fn process_chunk(&mut self, chunk: &str) -> bool {
        let Self { markers, state } = self;
        let before = (state.answer.len(), state.reasoning.len());

        let mut input = std::mem::take(&mut state.pending);
        input.push_str(chunk);
        let mut rest = input.as_str();

        while !rest.is_empty() {
            let marker = match state.mode {
                SplitMode::Answer => markers.open.as_str(),
                SplitMode::Thinking => markers.close.as_str(),
            };

            if let Some(pos) = rest.find(marker) {
                state.append(&rest[..pos]);
                state.mode = match state.mode {
                    SplitMode::Answer => SplitMode::Thinking,
                    SplitMode::Thinking => SplitMode::Answer,
                };
                rest = &rest[pos + marker.len()..];
            } else {
                let held = partial_marker_suffix(rest, marker);
                let (commit, hold) = rest.split_at(rest.len() - held);
                state.append(commit);
                state.pending = hold.to_string();
                break;
            }
        }

        before != (state.answer.len(), state.reasoning.len())
    }

    /// Append text to the answer without marker detection.
    pub fn push_answer(&mut self, text: &str) -> bool {
        self.state.answer.push_str(text);
        !text.is_empty()
    }

    /// Commit any held-back text to the current buffer.
    ///
    /// Returns `true` when an accumulator grew.
    pub fn finish(&mut self) -> bool {
        let pending = std::mem::take(&mut self.state.pending);
        self.state.append(&pending);
        !pending.is_empty()
    }

    /// Accumulated answer.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.state.answer
    }

    /// Accumulated reasoning.
    #[must_use]
    pub fn reasoning(&self) -> &str {
        &self.state.reasoning
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SplitMode {
        self.state.mode
    }

    /// Full state snapshot.
    #[must_use]
    pub fn state(&self) -> &SplitState {
        &self.state
    }

    /// Whether nothing has been accumulated or held back.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.answer.is_empty()
            && self.state.reasoning.is_empty()
            && self.state.pending.is_empty()
    }

    /// Back to answer mode with empty buffers.
    pub fn reset(&mut self) {
        self.state = SplitState::default();
    }

    /// Cumulative chunk for the UI.
    #[must_use]
    pub fn chunk(&self) -> ChatResponseChunk {
        ChatResponseChunk::new(self.state.answer.clone(), &self.state.reasoning)
    }

    /// Terminal response built from the accumulators.
    #[must_use]
    pub fn response(&self) -> ChatResponse {
        ChatResponse::new(self.state.answer.clone(), &self.state.reasoning)
    }
}

/// Length of the longest proper prefix of `marker` that `text` ends with.
fn partial_marker_suffix(text: &str, marker: &str) -> usize {
    let max = marker.len().saturating_sub(1).min(text.len());
    (1..=max)
        .rev()
        .find(|&len| marker.is_char_boundary(len) && text.ends_with(&marker[..len]))
        .unwrap_or(0)
}
