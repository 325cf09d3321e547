/// Append-only text built from stream deltas.
///
/// Every non-empty fragment is appended and the full text so far is
/// published to the progress callback.
pub struct Accumulator<F>
where
    F: FnMut(&str),
{
    text: String,
    deltas: usize,
    on_progress: F,
}

impl<F> Accumulator<F>
where
    F: FnMut(&str),
{
    pub fn new(on_progress: F) -> Self {
        Self {
            text: String::new(),
            deltas: 0,
            on_progress,
        }
    }

    /// Append a fragment. Returns `false` (and does not notify) when the
    /// fragment is empty.
    pub fn append(&mut self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        self.text.push_str(fragment);
        self.deltas += 1;
        (self.on_progress)(&self.text);
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn delta_count(&self) -> usize {
        self.deltas
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl<F> std::fmt::Debug for Accumulator<F>
where
    F: FnMut(&str),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("len", &self.text.len())
            .field("deltas", &self.deltas)
            .finish()
    }
}
