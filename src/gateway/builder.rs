//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::Gateway;
use crate::cache::{CacheConfig, ResponseCache};
use crate::config::GatewayConfig;
use crate::providers::{HttpProvider, ProviderConfig, ProviderRegistry, RetryPolicy, TextProvider};
use crate::{Result, VerbatimError};

/// Main entry point for creating gateway instances.
pub struct Verbatim;

impl Verbatim {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> VerbatimBuilder {
        VerbatimBuilder::new()
    }
}

/// HTTP timeouts shared by all built-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Time allowed to establish a connection. Default: 5s.
    pub connect: Duration,
    /// Time allowed for the whole request, body included. Default: 60s.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(60),
        }
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect = timeout;
        self
    }

    pub fn request(mut self, timeout: Duration) -> Self {
        self.request = timeout;
        self
    }
}

enum ProviderSlot {
    Http(ProviderConfig),
    Custom(Arc<dyn TextProvider>),
}

/// Builder for configuring gateway instances.
///
/// Providers are registered in the order they are added; the first one is
/// active unless [`active`](Self::active) names another.
pub struct VerbatimBuilder {
    providers: Vec<ProviderSlot>,
    active: Option<String>,
    retry: RetryPolicy,
    cache: CacheConfig,
    timeouts: TimeoutConfig,
}

impl VerbatimBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            active: None,
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }

    /// Configure the Gemini provider.
    pub fn gemini(self, api_key: impl Into<String>) -> Self {
        self.provider(ProviderConfig::gemini(Some(api_key.into())))
    }

    /// Configure the OpenAI provider.
    pub fn openai(self, api_key: impl Into<String>) -> Self {
        self.provider(ProviderConfig::openai(Some(api_key.into())))
    }

    /// Configure the Anthropic provider.
    pub fn anthropic(self, api_key: impl Into<String>) -> Self {
        self.provider(ProviderConfig::anthropic(Some(api_key.into())))
    }

    /// Register an HTTP provider from an explicit config.
    pub fn provider(mut self, config: ProviderConfig) -> Self {
        self.providers.push(ProviderSlot::Http(config));
        self
    }

    /// Register any [`TextProvider`] implementation.
    pub fn custom_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.providers.push(ProviderSlot::Custom(provider));
        self
    }

    /// Select the initially active provider.
    pub fn active(mut self, name: impl Into<String>) -> Self {
        self.active = Some(name.into());
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Set the response cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the HTTP timeouts.
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Apply a loaded [`GatewayConfig`].
    ///
    /// Credentials are read from each provider's environment variable now.
    pub fn from_config(mut self, config: &GatewayConfig) -> Self {
        for provider in config.provider_configs() {
            self = self.provider(provider);
        }
        self.active = Some(config.active_provider.clone());
        self.retry = config.retry.to_policy();
        self.cache = config.cache.to_cache_config();
        self.timeouts = config.timeouts.to_timeout_config();
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<Gateway> {
        if self.providers.is_empty() {
            return Err(VerbatimError::NoProvider);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(self.timeouts.connect)
            .timeout(self.timeouts.request)
            .build()
            .map_err(|e| VerbatimError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let mut registry = ProviderRegistry::new();
        for slot in self.providers {
            match slot {
                ProviderSlot::Http(config) => {
                    registry.register(Arc::new(HttpProvider::new(config, http.clone())))
                }
                ProviderSlot::Custom(provider) => registry.register(provider),
            }
        }
        if let Some(name) = &self.active {
            registry.switch_active(name)?;
        }

        Ok(Gateway::new(
            registry,
            self.retry,
            ResponseCache::new(&self.cache),
        ))
    }
}

impl Default for VerbatimBuilder {
    fn default() -> Self {
        Self::new()
    }
}
