pub mod url;

pub use self::url::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by decoding HTML entities and collapsing every
/// whitespace run (non-breaking spaces included) into a single space
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized text, or `None` when nothing but whitespace is left
pub fn non_empty(text: &str) -> Option<String> {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
