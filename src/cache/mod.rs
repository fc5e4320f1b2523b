//! Caching subsystem.
//!
//! [`response::ResponseCache`] memoizes successful generations per
//! gateway instance. See the [`response`] module docs for fingerprinting,
//! expiry, and coalescing behaviour.

pub mod response;

pub use response::{CacheConfig, CacheLookup, Fingerprint, ResponseCache};
