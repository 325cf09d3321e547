//! Incremental UTF-8 decoding of transport chunks.

const REPLACEMENT: char = '\u{FFFD}';

/// Turns raw byte chunks into text without corrupting multi-byte
/// characters that straddle two reads.
///
/// An incomplete sequence at the end of a chunk is held back and
/// prefixed onto the next call. Invalid bytes are replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending ++ chunk` as is safe to emit.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        if self.pending.is_empty() {
            // Fast path: most chunks are complete UTF-8 on their own.
            if let Ok(s) = std::str::from_utf8(chunk) {
                return s.to_string();
            }
            self.pending.extend_from_slice(chunk);
        } else {
            self.pending.extend_from_slice(chunk);
        }

        let bytes = std::mem::take(&mut self.pending);
        let mut out = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this slice is well-formed
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &after[len..];
                        }
                        None => {
                            // Truncated sequence at the end; wait for more bytes.
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// End of stream: anything still held is an incomplete sequence and
    /// decodes to a replacement character.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let bytes = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
