//! Provider trait for text generation backends.
//!
//! A provider hides one backend's request/response shape behind a single
//! operation. The gateway never sees wire formats, only a
//! [`GenerationRequest`] going in and text (or a classified
//! [`VerbatimError`](crate::VerbatimError)) coming out.
//!
//! # Error Semantics
//!
//! Implementations must classify failures at the call site:
//! - `Transport` for connection/timeout failures (always retryable)
//! - `Server` for 5xx responses (retryable)
//! - `Client` for 4xx responses or an unrecognisable success body (fatal)
//!
//! # Example
//!
//! ```ignore
//! async fn generate(&self, request: &GenerationRequest) -> Result<String> {
//!     let response = self.http.post(&self.url).json(&body).send().await
//!         .map_err(|e| VerbatimError::Transport(e.to_string()))?;
//!     // ... classify status, parse body
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::GenerationRequest;

/// Backend that turns a prompt into generated text.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name, used as the registry key and in logs/metrics.
    fn name(&self) -> &str;

    /// Whether a credential is configured. Providers without one stay
    /// registered (so they can be selected) but are not listed as available.
    fn has_credential(&self) -> bool;

    /// Generate text for a single request. Called once per attempt.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
