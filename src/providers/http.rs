//! HTTP provider adapter for Gemini, OpenAI, and Anthropic.
//!
//! One [`HttpProvider`] per configured provider, all sharing a single
//! `reqwest::Client`. The client carries two distinct timeouts: a short
//! connect timeout (a slow connect usually means the host is unreachable)
//! and a longer overall timeout (slow generations are normal).

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::traits::TextProvider;
use super::wire::{ANTHROPIC_VERSION, AuthPlacement, WireShape, error_message};
use crate::types::GenerationRequest;
use crate::{Result, VerbatimError};

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Static description of one provider.
///
/// Immutable once registered. The `Debug` output never includes the key.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    /// Registry name (e.g. `"gemini"`).
    pub name: String,
    /// Credential; `None` keeps the provider registered but unavailable.
    pub api_key: Option<String>,
    /// Full request URL.
    pub endpoint: String,
    /// Model identifier sent in the body (unused by Gemini).
    pub model: String,
    /// Request/response shape.
    pub shape: WireShape,
}

impl ProviderConfig {
    /// Create a config with an explicit name, shape, and endpoint.
    pub fn new(name: impl Into<String>, shape: WireShape, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: None,
            endpoint: endpoint.into(),
            model: String::new(),
            shape,
        }
    }

    /// Create a config using `shape`'s stock endpoint and model.
    pub fn for_shape(name: impl Into<String>, shape: WireShape) -> Self {
        let (endpoint, model) = match shape {
            WireShape::Gemini => (GEMINI_ENDPOINT, ""),
            WireShape::OpenAi => (OPENAI_ENDPOINT, OPENAI_DEFAULT_MODEL),
            WireShape::Anthropic => (ANTHROPIC_ENDPOINT, ANTHROPIC_DEFAULT_MODEL),
        };
        Self::new(name, shape, endpoint).model(model)
    }

    /// Default Gemini provider (`gemini-2.5-flash`).
    pub fn gemini(api_key: Option<String>) -> Self {
        Self::for_shape("gemini", WireShape::Gemini).api_key(api_key)
    }

    /// Default OpenAI provider.
    pub fn openai(api_key: Option<String>) -> Self {
        Self::for_shape("openai", WireShape::OpenAi).api_key(api_key)
    }

    /// Default Anthropic provider.
    pub fn anthropic(api_key: Option<String>) -> Self {
        Self::for_shape("anthropic", WireShape::Anthropic).api_key(api_key)
    }

    /// Set (or clear) the credential. Empty strings count as unset.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    /// Override the endpoint URL (e.g. for a proxy or a mock server).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("shape", &self.shape)
            .finish()
    }
}

/// [`TextProvider`] that speaks one provider's HTTP API.
#[derive(Clone)]
pub struct HttpProvider {
    config: ProviderConfig,
    http: Client,
}

impl HttpProvider {
    /// Create a provider using a shared HTTP client.
    ///
    /// Timeouts are a property of the client; see
    /// [`TimeoutConfig`](crate::TimeoutConfig).
    pub fn new(config: ProviderConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// The provider's configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl TextProvider for HttpProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let key = self.config.api_key.as_deref().ok_or_else(|| {
            VerbatimError::Configuration(format!(
                "provider '{}' has no credential configured",
                self.config.name
            ))
        })?;
        let shape = self.config.shape;

        let mut builder = self
            .http
            .post(&self.config.endpoint)
            .json(&shape.build_body(&self.config.model, request));
        builder = match shape.auth() {
            AuthPlacement::Query(param) => builder.query(&[(param, key)]),
            AuthPlacement::Bearer => builder.bearer_auth(key),
            AuthPlacement::Header(name) => builder.header(name, key),
        };
        if shape == WireShape::Anthropic {
            builder = builder.header("anthropic-version", ANTHROPIC_VERSION);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status.is_server_error() {
            return Err(VerbatimError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        if !status.is_success() {
            return Err(VerbatimError::Client {
                status: Some(status.as_u16()),
                message: error_message(&body),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| VerbatimError::Client {
            status: Some(status.as_u16()),
            message: format!("malformed response body: {e}"),
        })?;

        shape
            .parse_text(&json)
            .ok_or_else(|| VerbatimError::Client {
                status: Some(status.as_u16()),
                message: format!(
                    "response from '{}' has no recognisable {shape:?} payload",
                    self.config.name
                ),
            })
    }
}

/// Map a reqwest failure to a transport error.
///
/// The URL is stripped first: Gemini carries its key in the query string.
fn transport_error(err: reqwest::Error) -> VerbatimError {
    VerbatimError::Transport(err.without_url().to_string())
}
