//! Locates JSON candidates embedded in free text.
//!
//! Only the first candidate of each kind is returned; later fenced blocks or
//! brace spans in the same reply are ignored.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n?(.*?)```").expect("valid regex"));

/// Body of the first fenced code block labeled `json`.
pub fn fenced_json(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .filter(|body| !body.is_empty())
}

/// First balanced top-level `{...}` span.
///
/// Braces inside JSON string literals (including escaped quotes) do not count
/// towards nesting. Returns `None` when the first opening brace is never
/// closed.
pub fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
