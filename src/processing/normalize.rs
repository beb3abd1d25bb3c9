//! Whitespace normalization for extracted page text.

use regex::Regex;
use std::sync::OnceLock;

fn horizontal_whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("valid regex"))
}

fn blank_line_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Normalize raw page text for chunking.
///
/// Carriage returns become spaces, runs of spaces and tabs collapse to one
/// space, three or more consecutive newlines collapse to exactly two, and the
/// ends are trimmed. An empty result is valid and means the page carries no
/// indexable text.
pub fn normalize(text: &str) -> String {
    let text = text.replace('\r', " ");
    let text = horizontal_whitespace().replace_all(&text, " ");
    let text = blank_line_runs().replace_all(&text, "\n\n");
    text.trim().to_string()
}
