//! Per-provider wire formats.
//!
//! Each [`WireShape`] knows how to build its request body, where its
//! credential goes, and how to pull text out of a successful response.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::types::GenerationRequest;

/// Anthropic API version header value.
pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request/response shape tag for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireShape {
    /// Google Gemini `generateContent`. Key travels in the query string.
    Gemini,
    /// OpenAI chat completions. Key travels as a bearer token.
    OpenAi,
    /// Anthropic messages. Key travels in the `x-api-key` header.
    Anthropic,
}

/// Where a shape places its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthPlacement {
    Query(&'static str),
    Bearer,
    Header(&'static str),
}

impl WireShape {
    pub(crate) fn auth(self) -> AuthPlacement {
        match self {
            WireShape::Gemini => AuthPlacement::Query("key"),
            WireShape::OpenAi => AuthPlacement::Bearer,
            WireShape::Anthropic => AuthPlacement::Header("x-api-key"),
        }
    }

    /// Build the JSON payload for `request`.
    ///
    /// `model` is ignored by Gemini, whose model is part of the endpoint URL.
    pub(crate) fn build_body(self, model: &str, request: &GenerationRequest) -> Value {
        match self {
            WireShape::Gemini => json!({
                "contents": [{ "parts": [{ "text": request.prompt }] }],
                "generationConfig": {
                    "temperature": request.temperature,
                    "maxOutputTokens": request.max_tokens,
                },
            }),
            WireShape::OpenAi => json!({
                "model": model,
                "messages": [{ "role": "user", "content": request.prompt }],
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
            }),
            WireShape::Anthropic => json!({
                "model": model,
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
                "messages": [{ "role": "user", "content": request.prompt }],
            }),
        }
    }

    /// Extract generated text from a successful response body.
    ///
    /// Returns `None` when the body lacks the shape's success structure.
    pub(crate) fn parse_text(self, body: &Value) -> Option<String> {
        let text = match self {
            WireShape::Gemini => body
                .get("candidates")?
                .get(0)?
                .get("content")?
                .get("parts")?
                .get(0)?
                .get("text")?,
            WireShape::OpenAi => body
                .get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?,
            WireShape::Anthropic => body
                .get("content")?
                .as_array()?
                .iter()
                .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
                .get("text")?,
        };
        text.as_str().map(str::to_owned)
    }
}

/// Pull a human-readable error message out of a provider error body.
///
/// All three providers use `{"error": {"message": ...}}`; anything else
/// falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
