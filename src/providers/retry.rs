//! Retry configuration, delay calculation, and the provider decorator.
//!
//! Provider clients never retry on their own. The aggregator builder wraps
//! clients in [`RetryingProvider`] when a [`RetryConfig`] with more than one
//! attempt is set. The default is a single attempt: a failed upstream call
//! surfaces as a provider failure immediately.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::telemetry;

use super::traits::{ProviderClient, RawProviderResponse};
use crate::types::{ProviderId, ProviderQuery};
use crate::{FeedError, Result};

/// Configuration for retry behaviour on transient provider errors.
///
/// Uses exponential backoff:
///
/// ```rust
/// # use camfeed::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(200));
/// assert_eq!(config.delay_for_attempt(1), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 1.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 250ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 5s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Create a new config (single attempt, no retry).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this config performs any retries.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt` (0-indexed):
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Execute an async operation with retry logic.
///
/// Retries on transient errors (as classified by [`FeedError::is_transient()`])
/// up to `config.max_attempts`. Permanent errors are returned immediately.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    provider: ProviderId,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..config.max_attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                if attempt + 1 < config.max_attempts {
                    metrics::counter!(telemetry::RETRIES_TOTAL, "provider" => provider.as_str())
                        .increment(1);
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        provider = %provider,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or(FeedError::NoProvider))
}

/// Decorator that wraps a [`ProviderClient`] with retry logic.
pub struct RetryingProvider {
    inner: Arc<dyn ProviderClient>,
    config: RetryConfig,
}

impl RetryingProvider {
    /// Wrap a provider client with retry logic.
    pub fn new(inner: Arc<dyn ProviderClient>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl ProviderClient for RetryingProvider {
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn cache_ttl(&self) -> Option<Duration> {
        self.inner.cache_ttl()
    }

    fn fetch_limit(&self) -> usize {
        self.inner.fetch_limit()
    }

    async fn fetch_raw(&self, query: &ProviderQuery) -> Result<RawProviderResponse> {
        with_retry(&self.config, self.inner.id(), || self.inner.fetch_raw(query)).await
    }
}
