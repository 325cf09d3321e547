//! Streaming completion consumer
//!
//! Every generation feature (syllabus, lesson plan, quiz, Q&A, homework
//! help) answers with a `text/event-stream` body. This module turns that
//! body into one growing string:
//!
//! - [`ChunkDecoder`]: bytes to text, holding split UTF-8 sequences
//! - [`LineSplitter`]: text to complete lines, partial lines stay buffered
//! - [`classify`] / [`try_parse`]: line to frame to payload
//! - [`Accumulator`]: deltas appended in order, progress published
//!
//! A [`StreamSession`] owns one instance of each for a single call, so
//! concurrent generations never share buffers.

mod accumulator;
mod decoder;
mod parser;
mod splitter;

pub use accumulator::Accumulator;
pub use decoder::ChunkDecoder;
pub use parser::{
    classify, try_parse, Frame, Payload, TryParse, COMMENT_MARKER, DATA_PREFIX, DONE_SENTINEL,
};
pub use splitter::LineSplitter;

use crate::errors::StreamError;
use crate::telemetry::sanitize_for_log;
use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Longest slice of a dropped frame included in diagnostics.
const DIAGNOSTIC_PREVIEW_CHARS: usize = 120;

/// Lifecycle of one streaming call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Receiving,
    Draining,
    Done,
    Errored,
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamState::Idle => write!(f, "idle"),
            StreamState::Receiving => write!(f, "receiving"),
            StreamState::Draining => write!(f, "draining"),
            StreamState::Done => write!(f, "done"),
            StreamState::Errored => write!(f, "errored"),
        }
    }
}

/// Counters for one streaming call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks fed into the session
    pub chunks: u64,
    /// Raw bytes fed into the session
    pub bytes_received: u64,
    /// Non-empty deltas appended
    pub deltas: u64,
    /// Lines pushed back to wait for more data
    pub reinsertions: u64,
    /// Frames still unparsable at the end of the stream
    pub dropped_frames: u64,
    /// Whether `data: [DONE]` was seen
    pub sentinel_seen: bool,
}

impl std::fmt::Display for StreamStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} chunks, {} bytes, {} deltas, {} retries, {} dropped",
            self.chunks, self.bytes_received, self.deltas, self.reinsertions, self.dropped_frames
        )
    }
}

/// Result of a completed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub stats: StreamStats,
}

enum LineOutcome {
    Next,
    Incomplete(serde_json::Error),
}

/// Call-scoped state of one streaming generation.
pub struct StreamSession<F>
where
    F: FnMut(&str),
{
    decoder: ChunkDecoder,
    splitter: LineSplitter,
    accumulator: Accumulator<F>,
    state: StreamState,
    stats: StreamStats,
}

impl<F> StreamSession<F>
where
    F: FnMut(&str),
{
    pub fn new(on_progress: F) -> Self {
        Self {
            decoder: ChunkDecoder::new(),
            splitter: LineSplitter::new(),
            accumulator: Accumulator::new(on_progress),
            state: StreamState::Idle,
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    fn transition(&mut self, to: StreamState) {
        if self.state != to {
            debug!("stream state {} -> {}", self.state, to);
            self.state = to;
        }
    }

    /// Process one raw chunk from the transport.
    pub fn feed(&mut self, chunk: &[u8]) {
        match self.state {
            StreamState::Idle | StreamState::Receiving => {}
            other => {
                debug!("ignoring {} bytes fed in state {}", chunk.len(), other);
                return;
            }
        }
        self.transition(StreamState::Receiving);
        self.stats.chunks += 1;
        self.stats.bytes_received += chunk.len() as u64;

        let text = self.decoder.decode(chunk);
        self.splitter.push(&text);

        while let Some(line) = self.splitter.next_line() {
            if let LineOutcome::Incomplete(e) = self.handle_line(&line) {
                // Later lines of this batch must wait behind it.
                debug!("payload not parseable yet ({}), waiting for more data", e);
                self.splitter.push_front(&line);
                self.stats.reinsertions += 1;
                break;
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> LineOutcome {
        match classify(line) {
            Frame::Skip => LineOutcome::Next,
            Frame::Done => {
                if !self.stats.sentinel_seen {
                    debug!("end-of-content sentinel received");
                }
                self.stats.sentinel_seen = true;
                LineOutcome::Next
            }
            Frame::Data(_) if self.stats.sentinel_seen => LineOutcome::Next,
            Frame::Data(candidate) => match try_parse(candidate) {
                TryParse::Parsed(payload) => {
                    if let Some(delta) = payload.delta() {
                        if self.accumulator.append(delta) {
                            self.stats.deltas += 1;
                        }
                    }
                    LineOutcome::Next
                }
                TryParse::Incomplete(e) => LineOutcome::Incomplete(e),
            },
        }
    }

    /// Final pass over whatever is still buffered once the transport has
    /// ended. Safe to call more than once.
    pub fn flush(&mut self) {
        if self.state == StreamState::Errored {
            return;
        }
        if self.state != StreamState::Done {
            self.transition(StreamState::Draining);
        }

        let tail = self.decoder.finish();
        if !tail.is_empty() {
            self.splitter.push(&tail);
        }

        for line in self.splitter.take_remaining() {
            if let LineOutcome::Incomplete(e) = self.handle_line(&line) {
                self.stats.dropped_frames += 1;
                let preview: String = line.chars().take(DIAGNOSTIC_PREVIEW_CHARS).collect();
                warn!(
                    "dropping unparsable frame at end of stream: {} ({})",
                    sanitize_for_log(&preview),
                    e
                );
            }
        }

        self.transition(StreamState::Done);
    }

    /// Mark the call as failed. Nothing fed afterwards is processed.
    pub fn fail(&mut self) {
        self.transition(StreamState::Errored);
    }

    /// Flush and hand back the accumulated text.
    pub fn finish(mut self) -> Completion {
        self.flush();
        Completion {
            text: self.accumulator.into_text(),
            stats: self.stats,
        }
    }
}

impl<F> std::fmt::Debug for StreamSession<F>
where
    F: FnMut(&str),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("state", &self.state)
            .field("buffered", &self.splitter.len())
            .field("stats", &self.stats)
            .finish()
    }
}

struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Caller-driven cancellation shared between the UI side and a running
/// generation.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Drive a streamed response body to completion.
///
/// `on_progress` receives the full text after every appended delta. A
/// transport error or cancellation discards the partial text.
pub async fn consume<S, B, E, F>(
    mut stream: S,
    cancel: &CancelToken,
    on_progress: F,
) -> Result<Completion, StreamError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(&str),
{
    let mut session = StreamSession::new(on_progress);

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = stream.next() => Some(item),
        };

        let Some(item) = next else {
            session.fail();
            debug!("generation cancelled after {} deltas", session.stats().deltas);
            return Err(StreamError::Cancelled);
        };

        match item {
            Some(Ok(chunk)) => session.feed(chunk.as_ref()),
            Some(Err(e)) => {
                session.fail();
                warn!("stream read failed: {}", e);
                return Err(StreamError::Transport(e.to_string()));
            }
            None => break,
        }
    }

    let completion = session.finish();
    debug!("stream complete: {}", completion.stats);
    Ok(completion)
}
