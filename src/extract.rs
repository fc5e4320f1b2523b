//! Structured-data recovery from free-form model output.
//!
//! Models asked for JSON frequently answer with a fenced markdown block,
//! a sentence of preamble, or a payload cut off mid-stream. [`extract_json`]
//! tries, in order:
//!
//! 1. the payload of a ```` ```json ```` fence (an unclosed fence runs to the
//!    end of the text),
//! 2. the slice from the first `{` to the last `}`,
//! 3. the whole text with any leading/trailing fence markers removed.
//!
//! The first step that parses to a JSON object wins. Arrays and scalars do
//! not count. When every step fails the caller gets
//! [`Extraction::Failed`] carrying the raw text; extraction never errors.

use serde_json::{Map, Value};
use tracing::warn;

use crate::telemetry;

const FENCE: &str = "```";

/// Outcome of [`extract_json`].
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A JSON object was recovered.
    Object(Map<String, Value>),
    /// Nothing parseable; `raw` is the input as given.
    Failed { raw: String },
}

impl Extraction {
    /// Whether an object was recovered.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Borrow the recovered object, if any.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            Self::Failed { .. } => None,
        }
    }

    /// String value of a top-level field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.as_object()?.get(key)?.as_str()
    }

    /// The recovered object, or `{key: raw}` on failure.
    ///
    /// ```rust
    /// # use verbatim::extract::extract_json;
    /// let map = extract_json("not json").into_object_or("analysis");
    /// assert_eq!(map["analysis"], "not json");
    /// ```
    pub fn into_object_or(self, key: &str) -> Map<String, Value> {
        match self {
            Self::Object(map) => map,
            Self::Failed { raw } => {
                let mut map = Map::new();
                map.insert(key.to_owned(), Value::String(raw));
                map
            }
        }
    }
}

/// Recover a JSON object from `text`.
pub fn extract_json(text: &str) -> Extraction {
    let attempt = extract_fenced(text, "json")
        .and_then(parse_object)
        .or_else(|| outer_braces(text).and_then(parse_object))
        .or_else(|| parse_object(strip_fences(text)));

    match attempt {
        Some(map) => Extraction::Object(map),
        None => {
            metrics::counter!(telemetry::EXTRACTION_FAILURES_TOTAL).increment(1);
            warn!(
                preview = %text.chars().take(100).collect::<String>(),
                "no JSON object in model output"
            );
            Extraction::Failed {
                raw: text.to_owned(),
            }
        }
    }
}

/// Payload of the first ```` ```{lang} ```` fence in `text`, trimmed.
///
/// The tag must be followed by whitespace or the end of text, so `"json"`
/// does not match a ```` ```jsonc ```` fence. A fence with no closing
/// marker runs to the end of `text`.
pub fn extract_fenced<'a>(text: &'a str, lang: &str) -> Option<&'a str> {
    let marker = format!("{FENCE}{lang}");
    let mut from = 0;
    while let Some(pos) = text[from..].find(&marker) {
        let start = from + pos + marker.len();
        let rest = &text[start..];
        if rest.chars().next().is_none_or(char::is_whitespace) {
            let body = match rest.find(FENCE) {
                Some(end) => &rest[..end],
                None => rest,
            };
            return Some(body.trim());
        }
        from = start;
    }
    None
}

/// `text` trimmed, minus a leading fence line and a trailing fence marker.
pub fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix(FENCE) {
        s = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = s.trim_end().strip_suffix(FENCE) {
        s = rest;
    }
    s.trim()
}

fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(s) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
