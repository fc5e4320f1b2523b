//! Core TextGateway trait

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::{GenerationRequest, Result};

/// The gateway contract that features generate text through.
///
/// [`Gateway`](crate::Gateway) is the production implementation. Higher
/// layers such as [`Humanizer`](crate::humanize::Humanizer) depend on this
/// trait so they can be driven by any implementation.
#[async_trait]
pub trait TextGateway: Send + Sync {
    /// Generate text for a single request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Names of providers that have a credential, in registration order.
    fn list_available(&self) -> Vec<String>;

    /// Name of the provider used when a request does not name one.
    fn active_provider(&self) -> String;

    /// Change the active provider.
    fn switch_active(&self, name: &str) -> Result<()>;

    /// Generate text for several requests concurrently.
    ///
    /// Results are returned in input order, one per request. A failed item
    /// never cancels or fails its siblings.
    async fn generate_batch(&self, requests: &[GenerationRequest]) -> Vec<Result<String>> {
        join_all(requests.iter().map(|request| self.generate(request))).await
    }
}
