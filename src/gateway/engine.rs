//! Gateway - the single path from a request to provider text

use std::time::Instant;

use async_trait::async_trait;
use tracing::{Span, field, instrument};

use crate::cache::ResponseCache;
use crate::providers::{ProviderRegistry, RetryPolicy, TextProvider, with_retry};
use crate::telemetry;
use crate::{GenerationRequest, Result, TextGateway, VerbatimError};

/// Cached, retrying front door to the configured providers.
///
/// Built with [`Verbatim::builder`](crate::Verbatim::builder). Each request
/// resolves its provider once at entry, so a concurrent
/// [`switch_active`](TextGateway::switch_active) only affects requests that
/// start afterwards.
pub struct Gateway {
    registry: ProviderRegistry,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl Gateway {
    pub(crate) fn new(registry: ProviderRegistry, retry: RetryPolicy, cache: ResponseCache) -> Self {
        Self {
            registry,
            retry,
            cache,
        }
    }

    /// Convenience wrapper around [`TextGateway::generate`] using the
    /// active provider.
    pub async fn generate_text(
        &self,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = GenerationRequest::new(prompt)
            .max_tokens(max_tokens)
            .temperature(temperature);
        self.generate(&request).await
    }

    /// The response cache owned by this gateway.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The retry policy applied to every provider call.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// All registered provider names, with or without credentials.
    pub fn providers(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Run the provider call under the retry policy and record its outcome.
    async fn dispatch(
        &self,
        provider: &dyn TextProvider,
        request: &GenerationRequest,
    ) -> Result<String> {
        let name = provider.name().to_owned();
        let start = Instant::now();
        let result = with_retry(&self.retry, &name, || provider.generate(request)).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => name.clone(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => name,
        )
        .record(start.elapsed().as_secs_f64());

        result
    }
}

fn check_request(request: &GenerationRequest) -> Result<()> {
    if request.prompt.trim().is_empty() {
        return Err(VerbatimError::InvalidInput("prompt must not be empty".into()));
    }
    if request.max_tokens == 0 {
        return Err(VerbatimError::InvalidInput(
            "max_tokens must be greater than zero".into(),
        ));
    }
    Ok(())
}

#[async_trait]
impl TextGateway for Gateway {
    #[instrument(
        skip(self, request),
        fields(operation = "generate", provider = field::Empty, max_tokens = request.max_tokens)
    )]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        check_request(request)?;

        let provider = self.registry.resolve(request.provider.as_deref())?;
        Span::current().record("provider", provider.name());
        if !provider.has_credential() {
            return Err(VerbatimError::Configuration(format!(
                "provider '{}' has no credential configured",
                provider.name()
            )));
        }

        let fingerprint = self.cache.fingerprint(provider.name(), request);
        let lookup = self
            .cache
            .get_or_try_insert_with(fingerprint, self.dispatch(provider.as_ref(), request))
            .await?;
        Ok(lookup.text)
    }

    fn list_available(&self) -> Vec<String> {
        self.registry.list_available()
    }

    fn active_provider(&self) -> String {
        self.registry.active()
    }

    fn switch_active(&self, name: &str) -> Result<()> {
        self.registry.switch_active(name)
    }
}
