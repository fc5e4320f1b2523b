//! Response cache for completed generations.
//!
//! [`ResponseCache`] memoizes successful provider text keyed by a
//! [`Fingerprint`] of `(provider, prompt prefix, max_tokens, temperature)`.
//! Failures are never stored: a provider error for one request must not
//! poison later identical requests.
//!
//! # Expiry
//!
//! Entries live for [`CacheConfig::ttl`] from insertion. moka never returns
//! an expired entry; a lookup that finds one reports a miss and the entry
//! is dropped during housekeeping. Once the entry count passes
//! [`CacheConfig::high_water_mark`], inserts also run an eager sweep so
//! high request variety cannot grow the map without bound.
//!
//! # Prompt prefix
//!
//! By default only the first 100 characters of the prompt feed the
//! fingerprint. Long templated prompts that share a prefix therefore share
//! a cache slot. Set [`CacheConfig::fingerprint_prefix`] to `None` to hash
//! the full prompt instead.
//!
//! # Coalescing
//!
//! [`ResponseCache::get_or_try_insert_with`] lets concurrent callers with
//! the same fingerprint wait on a single computation instead of each
//! calling the provider.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, info};

use crate::telemetry;
use crate::types::GenerationRequest;
use crate::{Result, VerbatimError};

/// Number of prompt characters hashed into a fingerprint by default.
pub const DEFAULT_FINGERPRINT_PREFIX: usize = 100;

/// Configuration for the response cache.
///
/// ```rust
/// # use verbatim::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .ttl(Duration::from_secs(600))
///     .full_prompt_fingerprint();
/// assert!(config.fingerprint_prefix.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
    /// Entry count above which inserts trigger an expiry sweep. Default: 1,000.
    pub high_water_mark: u64,
    /// Prompt characters hashed into the fingerprint; `None` = whole prompt.
    /// Default: 100.
    pub fingerprint_prefix: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            high_water_mark: 1_000,
            fingerprint_prefix: Some(DEFAULT_FINGERPRINT_PREFIX),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the entry count that triggers an eager expiry sweep.
    pub fn high_water_mark(mut self, n: u64) -> Self {
        self.high_water_mark = n;
        self
    }

    /// Hash only the first `chars` characters of the prompt.
    pub fn fingerprint_prefix(mut self, chars: usize) -> Self {
        self.fingerprint_prefix = Some(chars);
        self
    }

    /// Hash the full prompt (exact-match caching).
    pub fn full_prompt_fingerprint(mut self) -> Self {
        self.fingerprint_prefix = None;
        self
    }
}

/// Cache identity of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Compute a fingerprint.
    ///
    /// Uses `DefaultHasher` (SipHash). The hash is stable within a process
    /// lifetime, which is all an in-memory cache needs. Temperature is
    /// hashed by its bit pattern.
    pub fn new(
        provider: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
        prefix: Option<usize>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        provider.hash(&mut hasher);
        prompt_prefix(prompt, prefix).hash(&mut hasher);
        max_tokens.hash(&mut hasher);
        temperature.to_bits().hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Fingerprint `request` as sent to `provider`.
    pub fn for_request(provider: &str, request: &GenerationRequest, prefix: Option<usize>) -> Self {
        Self::new(
            provider,
            &request.prompt,
            request.max_tokens,
            request.temperature,
            prefix,
        )
    }

    /// Raw hash value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// First `prefix` characters of `prompt` (char-boundary safe).
fn prompt_prefix(prompt: &str, prefix: Option<usize>) -> &str {
    match prefix.and_then(|n| prompt.char_indices().nth(n)) {
        Some((end, _)) => &prompt[..end],
        None => prompt,
    }
}

/// Result of a coalescing lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLookup {
    /// Cached or freshly computed text.
    pub text: String,
    /// `true` if this call (or a coalesced peer) ran the computation.
    pub fresh: bool,
}

/// In-memory TTL cache of generated text.
pub struct ResponseCache {
    cache: Cache<Fingerprint, String>,
    high_water_mark: u64,
    fingerprint_prefix: Option<usize>,
    /// Upper bound on live entries. moka's own count only moves during
    /// housekeeping, so inserts bump this and every sweep resyncs it.
    tracked: AtomicU64,
}

impl ResponseCache {
    /// Create a new response cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder().time_to_live(config.ttl).build();
        Self {
            cache,
            high_water_mark: config.high_water_mark,
            fingerprint_prefix: config.fingerprint_prefix,
            tracked: AtomicU64::new(0),
        }
    }

    /// Fingerprint `request` as sent to `provider`, using this cache's
    /// prefix setting.
    pub fn fingerprint(&self, provider: &str, request: &GenerationRequest) -> Fingerprint {
        Fingerprint::for_request(provider, request, self.fingerprint_prefix)
    }

    /// Look up cached text.
    ///
    /// Returns `None` on miss, including when the entry has expired.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<String> {
        match self.cache.get(fingerprint).await {
            Some(text) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                Some(text)
            }
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                None
            }
        }
    }

    /// Store text for a fingerprint, replacing any previous entry.
    pub async fn insert(&self, fingerprint: Fingerprint, text: String) {
        self.cache.insert(fingerprint, text).await;
        self.note_insert().await;
    }

    /// Return the cached text, or run `init` once and cache its success.
    ///
    /// Concurrent callers with the same fingerprint wait on the first
    /// caller's `init` rather than starting their own. An `Err` from `init`
    /// is handed to every waiter and nothing is cached.
    pub async fn get_or_try_insert_with<F>(
        &self,
        fingerprint: Fingerprint,
        init: F,
    ) -> Result<CacheLookup>
    where
        F: Future<Output = Result<String>>,
    {
        let entry = self
            .cache
            .entry(fingerprint)
            .or_try_insert_with(init)
            .await
            .map_err(Arc::<VerbatimError>::unwrap_or_clone)?;

        let fresh = entry.is_fresh();
        if fresh {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
            self.note_insert().await;
        } else {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
            debug!(fingerprint = fingerprint.as_u64(), "response cache hit");
        }
        Ok(CacheLookup {
            text: entry.into_value(),
            fresh,
        })
    }

    /// Drop all expired entries now.
    pub async fn sweep(&self) {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks().await;
        let remaining = self.cache.entry_count();
        self.tracked.store(remaining, Ordering::Relaxed);
        info!(before, remaining, "response cache sweep");
    }

    /// Approximate number of live entries.
    ///
    /// moka updates its count during housekeeping, so the value may lag
    /// recent inserts until [`sweep`](Self::sweep) runs.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Evict all entries.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        self.tracked.store(0, Ordering::Relaxed);
    }

    async fn note_insert(&self) {
        let tracked = self.tracked.fetch_add(1, Ordering::Relaxed) + 1;
        if tracked > self.high_water_mark {
            self.sweep().await;
        }
    }
}
