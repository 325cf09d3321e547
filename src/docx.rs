//! Best-effort text extraction from raw DOCX bytes
//!
//! No archive handling: text runs are picked out of whatever `<w:t>`
//! elements are visible in the raw bytes. Callers fall back to another
//! extraction path when the result is not [`is_useful`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Shorter results mean direct extraction failed.
pub const MIN_USEFUL_LEN: usize = 50;

/// The printable fallback is only returned when it is longer than this.
const MIN_FALLBACK_LEN: usize = 100;

static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("invalid text run regex"));

static NON_PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E\n\r\t]").expect("invalid printable regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Extract readable text from DOCX bytes. Returns an empty string when
/// nothing usable was found.
pub fn extract_text(bytes: &[u8]) -> String {
    let raw = String::from_utf8_lossy(bytes);

    let runs: Vec<String> = TEXT_RUN
        .captures_iter(&raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|t| !t.is_empty())
        .map(unescape_xml)
        .collect();

    if !runs.is_empty() {
        tracing::debug!("extracted {} text runs", runs.len());
        return runs.join(" ");
    }

    let printable = NON_PRINTABLE.replace_all(&raw, " ");
    let collapsed = WHITESPACE.replace_all(&printable, " ");
    let readable = collapsed.trim();
    if readable.len() > MIN_FALLBACK_LEN {
        readable.to_string()
    } else {
        tracing::debug!("no text runs and only {} printable chars", readable.len());
        String::new()
    }
}

/// Whether direct extraction produced enough text to use.
pub fn is_useful(text: &str) -> bool {
    text.chars().count() >= MIN_USEFUL_LEN
}
