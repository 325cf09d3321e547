//! Classification of protocol lines and payload decoding.
//!
//! Frames look like `data: {"choices":[{"delta":{"content":"..."}}]}`.
//! Lines starting with `:` are comments (used for keepalive), and
//! `data: [DONE]` marks the intentional end of content.

use serde_json::Value;

/// Prefix of lines carrying a payload.
pub const DATA_PREFIX: &str = "data:";

/// Lines starting with this are comments/keepalives.
pub const COMMENT_MARKER: char = ':';

/// Payload value marking the end of meaningful content.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a single protocol line means to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Blank, comment, empty `data:`, or a field we don't understand.
    Skip,
    /// The `[DONE]` sentinel.
    Done,
    /// Candidate payload, already trimmed.
    Data(&'a str),
}

/// Classify one line (terminator already removed).
pub fn classify(line: &str) -> Frame<'_> {
    if line.trim().is_empty() || line.starts_with(COMMENT_MARKER) {
        return Frame::Skip;
    }
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };
    let payload = rest.trim();
    if payload.is_empty() {
        Frame::Skip
    } else if payload == DONE_SENTINEL {
        Frame::Done
    } else {
        Frame::Data(payload)
    }
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    /// The incremental text at `choices[0].delta.content`, if present.
    pub fn delta(&self) -> Option<&str> {
        self.0
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str())
    }

    /// `choices[0].finish_reason`, when the provider sends one.
    pub fn finish_reason(&self) -> Option<&str> {
        self.0
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("finish_reason"))
            .and_then(|r| r.as_str())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Outcome of decoding a candidate payload.
#[derive(Debug)]
pub enum TryParse {
    Parsed(Payload),
    /// Not (yet) well-formed JSON; typically cut off by the network.
    Incomplete(serde_json::Error),
}

pub fn try_parse(candidate: &str) -> TryParse {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => TryParse::Parsed(Payload(value)),
        Err(e) => TryParse::Incomplete(e),
    }
}
