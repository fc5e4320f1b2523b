//! Types for provider-neutral text generation requests.

use serde::{Deserialize, Serialize};

/// Default output token budget, matching the gateway contract.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature, matching the gateway contract.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A provider-neutral generation request.
///
/// Together with the resolved provider name this fully determines the
/// cache fingerprint.
///
/// ```rust
/// # use verbatim::GenerationRequest;
/// let request = GenerationRequest::new("Summarise this post")
///     .max_tokens(2000)
///     .temperature(0.3)
///     .provider("openai");
/// assert_eq!(request.max_tokens, 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text sent verbatim to the provider.
    pub prompt: String,

    /// Maximum number of output tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature. Passed through unclamped; providers reject
    /// out-of-range values with a client error.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Target provider. `None` means the gateway's active provider at the
    /// time the request enters the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl GenerationRequest {
    /// Create a request with the default token budget and temperature.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            provider: None,
        }
    }

    /// Set max output tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Pin the request to a named provider instead of the active one.
    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.provider = Some(name.into());
        self
    }
}
