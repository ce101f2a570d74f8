//! Telemetry metric name constants.
//!
//! Centralised metric names for camfeed operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `camfeed_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider wire name ("a", "b", "free")
//! - `status`: outcome: "ok", "unavailable" or "schema_mismatch"
//! - `namespace`: cache key namespace (provider name or "stats")

/// Total upstream provider calls (cache misses that reached a client).
///
/// Labels: `provider`, `status`.
pub const REQUESTS_TOTAL: &str = "camfeed_requests_total";

/// Upstream call duration in seconds.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "camfeed_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "camfeed_retries_total";

/// Total cache hits.
///
/// Labels: `namespace`.
pub const CACHE_HITS_TOTAL: &str = "camfeed_cache_hits_total";

/// Total cache misses.
///
/// Labels: `namespace`.
pub const CACHE_MISSES_TOTAL: &str = "camfeed_cache_misses_total";

/// Upstream records dropped during normalization.
///
/// Labels: `provider`.
pub const DROPPED_RECORDS_TOTAL: &str = "camfeed_dropped_records_total";
