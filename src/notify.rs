//! User-facing notifications and terminal output
//!
//! Generation failures and completions are surfaced through a [`Notifier`]
//! so that the CLI can print them and tests can record them. Streamed text
//! goes to stdout through a [`ProgressPrinter`]; notifications go to stderr.

use colored::*;
use std::io::Write;

/// Receiver of user-facing toasts.
pub trait Notifier: Send + Sync {
    fn error(&self, title: &str, message: &str);
    fn success(&self, title: &str, message: &str);
}

/// Prints notifications to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, symbol: &str, title: &str, message: &str, ok: bool) -> String {
        if !self.color {
            return format!("{} {}: {}", symbol, title, message);
        }
        let symbol = if ok {
            symbol.bright_green()
        } else {
            symbol.bright_red()
        };
        format!("{} {}: {}", symbol, title.bold(), message)
    }
}

impl Notifier for ConsoleNotifier {
    fn error(&self, title: &str, message: &str) {
        eprintln!("{}", self.render("✗", title, message, false));
    }

    fn success(&self, title: &str, message: &str) {
        eprintln!("{}", self.render("✓", title, message, true));
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn error(&self, _title: &str, _message: &str) {}
    fn success(&self, _title: &str, _message: &str) {}
}

/// Writes the unseen suffix of the accumulated text each time progress is
/// published.
///
/// The first write error stops further output and is returned by
/// [`ProgressPrinter::finish`].
pub struct ProgressPrinter<W: Write> {
    out: W,
    printed: usize,
    error: Option<std::io::Error>,
}

impl ProgressPrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            error: None,
        }
    }

    /// Accumulated text only grows, so everything past `printed` is new.
    pub fn update(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let Some(suffix) = text.get(self.printed..) else {
            return;
        };
        if suffix.is_empty() {
            return;
        }
        match self.write(suffix.as_bytes()) {
            Ok(()) => self.printed = text.len(),
            Err(e) => self.error = Some(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    /// End the streamed block with a newline if anything was printed, and
    /// report the first write failure.
    pub fn finish(&mut self) -> std::io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        if self.printed > 0 {
            self.write(b"\n")?;
        }
        Ok(())
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
