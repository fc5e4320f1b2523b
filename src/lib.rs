//! Verbatim - LLM gateway with retry, response caching, and fidelity checks
//!
//! Every feature that needs generated text goes through one [`Gateway`]:
//! it routes to the active provider (Gemini, OpenAI, Anthropic, or any
//! [`TextProvider`]), retries transient failures with exponential backoff,
//! and caches successful responses. The [`extract`] and [`fidelity`]
//! modules turn the raw text into something a program can trust.
//!
//! # Example
//!
//! ```rust,no_run
//! use verbatim::{GenerationRequest, TextGateway, Verbatim};
//! use verbatim::extract::extract_json;
//!
//! #[tokio::main]
//! async fn main() -> verbatim::Result<()> {
//!     let gateway = Verbatim::builder()
//!         .gemini("your-gemini-key")
//!         .anthropic("your-anthropic-key")
//!         .build()?;
//!
//!     let text = gateway
//!         .generate(&GenerationRequest::new("Describe our brand voice as JSON").temperature(0.3))
//!         .await?;
//!
//!     let voice = extract_json(&text).into_object_or("analysis");
//!     println!("{voice:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Validating a rewrite
//!
//! ```rust
//! use verbatim::fidelity::{FidelityValidator, RejectionReason};
//!
//! let validator = FidelityValidator::default();
//! let result = validator.validate(
//!     "Our new coffee blend ships Monday.",
//!     "I'm sorry, I cannot help with that.",
//! );
//! assert_eq!(result.reason, Some(RejectionReason::Refused));
//! ```

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fidelity;
pub mod gateway;
pub mod humanize;
pub mod providers;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use config::GatewayConfig;
pub use error::{ErrorClass, Result, VerbatimError};
pub use extract::{Extraction, extract_json};
pub use fidelity::{FidelityConfig, FidelityValidator, RejectionReason, ValidationResult};
pub use gateway::{Gateway, TimeoutConfig, Verbatim, VerbatimBuilder};
pub use providers::{ProviderConfig, RetryPolicy, TextProvider, WireShape};
pub use traits::TextGateway;
pub use types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenerationRequest};
