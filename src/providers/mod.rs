//! Provider adapters, registry, and retry executor.
//!
//! - [`traits::TextProvider`] is the provider-neutral contract.
//! - [`http::HttpProvider`] implements it for the Gemini, OpenAI, and
//!   Anthropic wire formats ([`wire::WireShape`]).
//! - [`registry::ProviderRegistry`] holds the providers and the active selector.
//! - [`retry::with_retry`] repeats transient failures per [`retry::RetryPolicy`].

pub mod http;
pub mod registry;
pub mod retry;
pub mod traits;
pub mod wire;

pub use http::{HttpProvider, ProviderConfig};
pub use registry::ProviderRegistry;
pub use retry::{RetryPolicy, with_retry};
pub use traits::TextProvider;
pub use wire::WireShape;
