//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. an explicit path
//! 2. `~/.verbatim/config.toml` (user)
//! 3. `/etc/verbatim/config.toml` (system)
//!
//! Credentials never live in the file. Each `[[providers]]` entry names the
//! environment variable holding its key, which is read when the config is
//! turned into a gateway.
//!
//! ```toml
//! active_provider = "anthropic"
//!
//! [cache]
//! ttl_secs = 600
//!
//! [[providers]]
//! name = "anthropic"
//! shape = "anthropic"
//! model = "claude-3-5-sonnet-latest"
//! api_key_env = "ANTHROPIC_API_KEY"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::fidelity::FidelityConfig;
use crate::providers::{ProviderConfig, RetryPolicy, WireShape};
use crate::{Result, TimeoutConfig, VerbatimError};

/// Environment variable selecting the active provider.
pub const ACTIVE_PROVIDER_ENV: &str = "ACTIVE_LLM_PROVIDER";

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Provider used when a request names none (default: "gemini").
    #[serde(default = "default_active_provider")]
    pub active_provider: String,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub timeouts: TimeoutsSection,
    #[serde(default)]
    pub fidelity: FidelityConfig,
    /// Provider definitions (default: gemini, openai, anthropic).
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderEntry>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            active_provider: default_active_provider(),
            cache: CacheSection::default(),
            retry: RetrySection::default(),
            timeouts: TimeoutsSection::default(),
            fidelity: FidelityConfig::default(),
            providers: default_providers(),
        }
    }
}

fn default_active_provider() -> String {
    "gemini".to_string()
}

fn default_providers() -> Vec<ProviderEntry> {
    [
        ("gemini", WireShape::Gemini, "GEMINI_API_KEY"),
        ("openai", WireShape::OpenAi, "OPENAI_API_KEY"),
        ("anthropic", WireShape::Anthropic, "ANTHROPIC_API_KEY"),
    ]
    .into_iter()
    .map(|(name, shape, env)| ProviderEntry {
        name: name.to_string(),
        shape,
        endpoint: None,
        model: None,
        api_key_env: Some(env.to_string()),
    })
    .collect()
}

/// One `[[providers]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    pub shape: WireShape,
    /// Overrides the shape's stock endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Overrides the shape's stock model.
    #[serde(default)]
    pub model: Option<String>,
    /// Environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderEntry {
    /// Resolve into a [`ProviderConfig`], reading the key through `env`.
    pub fn to_provider_config(&self, env: impl Fn(&str) -> Option<String>) -> ProviderConfig {
        let mut config = ProviderConfig::for_shape(&self.name, self.shape)
            .api_key(self.api_key_env.as_deref().and_then(env));
        if let Some(endpoint) = &self.endpoint {
            config = config.endpoint(endpoint);
        }
        if let Some(model) = &self.model {
            config = config.model(model);
        }
        config
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry lifetime in seconds (default: 3600).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Entry count that triggers an expiry sweep (default: 1000).
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: u64,
    /// Prompt characters hashed into the fingerprint; 0 hashes the whole
    /// prompt (default: 100).
    #[serde(default = "default_prefix_chars")]
    pub fingerprint_prefix_chars: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            high_water_mark: default_high_water_mark(),
            fingerprint_prefix_chars: default_prefix_chars(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_high_water_mark() -> u64 {
    1000
}

fn default_prefix_chars() -> usize {
    100
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        let config = CacheConfig::new()
            .ttl(Duration::from_secs(self.ttl_secs))
            .high_water_mark(self.high_water_mark);
        match self.fingerprint_prefix_chars {
            0 => config.full_prompt_fingerprint(),
            n => config.fingerprint_prefix(n),
        }
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in seconds (default: 3).
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    /// Backoff multiplier (default: 2).
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_secs() -> u64 {
    3
}

fn default_multiplier() -> u32 {
    2
}

impl RetrySection {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .max_attempts(self.max_attempts)
            .base_delay(Duration::from_secs(self.base_delay_secs))
            .multiplier(self.multiplier)
    }
}

/// `[timeouts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutsSection {
    /// Connect timeout in seconds (default: 5).
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    /// Whole-request timeout in seconds (default: 60).
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,
}

impl Default for TimeoutsSection {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            request_secs: default_request_secs(),
        }
    }
}

fn default_connect_secs() -> u64 {
    5
}

fn default_request_secs() -> u64 {
    60
}

impl TimeoutsSection {
    pub fn to_timeout_config(&self) -> TimeoutConfig {
        TimeoutConfig::new()
            .connect(Duration::from_secs(self.connect_secs))
            .request(Duration::from_secs(self.request_secs))
    }
}

impl GatewayConfig {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.verbatim/config.toml`
    /// 3. `/etc/verbatim/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            VerbatimError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            VerbatimError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| VerbatimError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Default configuration with the active provider taken from
    /// `ACTIVE_LLM_PROVIDER` (falling back to "gemini").
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(active) = env(ACTIVE_PROVIDER_ENV).filter(|v| !v.is_empty()) {
            config.active_provider = active;
        }
        config
    }

    /// Provider configs with credentials read from the process environment.
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        self.provider_configs_from(|var| std::env::var(var).ok())
    }

    /// Provider configs with credentials read through `env`.
    pub fn provider_configs_from(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Vec<ProviderConfig> {
        self.providers
            .iter()
            .map(|entry| entry.to_provider_config(&env))
            .collect()
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(VerbatimError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".verbatim").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/verbatim/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(VerbatimError::Configuration(
            "No config file found. Create ~/.verbatim/config.toml or /etc/verbatim/config.toml"
                .to_string(),
        ))
    }
}
