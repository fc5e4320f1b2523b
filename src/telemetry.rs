//! Telemetry metric name constants.
//!
//! Centralised metric names for verbatim operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `verbatim_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "gemini", "openai")
//! - `status`: outcome: "ok" or "error"
//! - `reason`: validation rejection reason (e.g. "too_short")

/// Total provider computations dispatched by the gateway (cache misses).
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "verbatim_requests_total";

/// Provider computation duration in seconds, retries included.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "verbatim_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "verbatim_retries_total";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "verbatim_cache_hits_total";

/// Total response cache misses (lookups that ran a computation).
pub const CACHE_MISSES_TOTAL: &str = "verbatim_cache_misses_total";

/// Total candidate texts rejected by the fidelity validator.
///
/// Labels: `reason`.
pub const VALIDATION_REJECTIONS_TOTAL: &str = "verbatim_validation_rejections_total";

/// Total responses from which no JSON object could be extracted.
pub const EXTRACTION_FAILURES_TOTAL: &str = "verbatim_extraction_failures_total";
