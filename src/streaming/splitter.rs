//! Line extraction over the decoded text buffer.

/// Accumulates decoded text and hands out complete `\n`-terminated lines.
///
/// A partial line stays buffered until a later chunk terminates it. A line
/// put back with [`push_front`](Self::push_front) waits in its own slot
/// ahead of the buffer.
#[derive(Debug, Default)]
pub struct LineSplitter {
    held: Option<String>,
    buffer: String,
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Remove and return the next complete line, without its terminator
    /// and with one trailing `\r` stripped.
    pub fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.held.take() {
            return Some(line);
        }
        let pos = self.buffer.find('\n')?;
        let mut line: String = self.buffer.drain(..=pos).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }

    /// Put a line back so it is the next line handed out.
    pub fn push_front(&mut self, line: &str) {
        if let Some(previous) = self.held.take() {
            // Only reachable if two lines are put back without a read.
            let mut restored = String::with_capacity(previous.len() + 1 + self.buffer.len());
            restored.push_str(&previous);
            restored.push('\n');
            restored.push_str(&self.buffer);
            self.buffer = restored;
        }
        self.held = Some(line.to_string());
    }

    /// Split whatever is left into lines, including a final fragment that
    /// never got its terminator. Empty fragments are dropped.
    pub fn take_remaining(&mut self) -> Vec<String> {
        let held = self.held.take();
        let rest = std::mem::take(&mut self.buffer);
        held.into_iter()
            .chain(rest.split('\n').map(|line| strip_cr(line).to_string()))
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none() && self.buffer.is_empty()
    }

    /// Bytes waiting, including a held line and its terminator.
    pub fn len(&self) -> usize {
        self.held.as_ref().map_or(0, |line| line.len() + 1) + self.buffer.len()
    }
}
