//! Builder for configuring aggregator instances

use std::sync::Arc;
use std::time::Duration;

use super::Aggregator;
use crate::cache::{CacheConfig, FeedCache};
use crate::catalog::Taxonomy;
use crate::providers::{
    Credentials, FreeClient, PartnerAClient, PartnerBClient, ProviderClient, ProviderSettings,
    RetryConfig, RetryingProvider,
};
use crate::types::{MAX_LIMIT, ProviderId};
use crate::{FeedError, Result};

/// Upper bound on one provider call, retries included.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Main entry point for creating aggregator instances.
pub struct CamFeed;

impl CamFeed {
    /// Create a new builder for configuring the aggregator.
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }
}

/// A provider waiting to be constructed by [`AggregatorBuilder::build`].
enum PendingProvider {
    PartnerA(ProviderSettings, Credentials),
    PartnerB(ProviderSettings, Credentials),
    Free(ProviderSettings),
    Custom(Arc<dyn ProviderClient>),
}

/// Builder for configuring aggregator instances.
///
/// Providers merge in the order they are registered.
///
/// ```rust,no_run
/// # use camfeed::{CamFeed, CacheConfig};
/// # use camfeed::providers::{Credentials, ProviderSettings};
/// # fn main() -> camfeed::Result<()> {
/// let feed = CamFeed::builder()
///     .partner_a(
///         ProviderSettings::new("https://api.partner-a.example"),
///         Credentials::new("site-1", "secret"),
///     )
///     .free(ProviderSettings::new("https://rooms.example"))
///     .cache(CacheConfig::new().max_entries(1_000))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct AggregatorBuilder {
    providers: Vec<PendingProvider>,
    cache: CacheConfig,
    taxonomy: Taxonomy,
    retry: RetryConfig,
    call_timeout: Duration,
    max_limit: usize,
}

impl AggregatorBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            cache: CacheConfig::default(),
            taxonomy: Taxonomy::default(),
            retry: RetryConfig::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_limit: MAX_LIMIT,
        }
    }

    /// Configure partner feed `a`.
    pub fn partner_a(mut self, settings: ProviderSettings, credentials: Credentials) -> Self {
        self.providers
            .push(PendingProvider::PartnerA(settings, credentials));
        self
    }

    /// Configure partner feed `b`.
    pub fn partner_b(mut self, settings: ProviderSettings, credentials: Credentials) -> Self {
        self.providers
            .push(PendingProvider::PartnerB(settings, credentials));
        self
    }

    /// Configure the public room listing.
    pub fn free(mut self, settings: ProviderSettings) -> Self {
        self.providers.push(PendingProvider::Free(settings));
        self
    }

    /// Register a custom client (tests, additional upstreams).
    pub fn provider(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.providers.push(PendingProvider::Custom(client));
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    pub fn taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    /// Retry transient provider failures. Disabled by default.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Bound each provider call; a call that overruns counts as unavailable.
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Largest page a listing returns (default: 100).
    pub fn max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit.max(1);
        self
    }

    /// Build the aggregator.
    ///
    /// Fails with [`FeedError::NoProvider`] when nothing is registered and
    /// with [`FeedError::Configuration`] when a provider is registered twice.
    pub fn build(self) -> Result<Aggregator> {
        if self.providers.is_empty() {
            return Err(FeedError::NoProvider);
        }

        let mut providers: Vec<Arc<dyn ProviderClient>> = Vec::with_capacity(self.providers.len());
        for pending in self.providers {
            let client: Arc<dyn ProviderClient> = match pending {
                PendingProvider::PartnerA(settings, credentials) => {
                    Arc::new(PartnerAClient::new(settings, credentials)?)
                }
                PendingProvider::PartnerB(settings, credentials) => {
                    Arc::new(PartnerBClient::new(settings, credentials)?)
                }
                PendingProvider::Free(settings) => Arc::new(FreeClient::new(settings)?),
                PendingProvider::Custom(client) => client,
            };
            if providers.iter().any(|p| p.id() == client.id()) {
                return Err(FeedError::Configuration(format!(
                    "provider '{}' registered more than once",
                    client.id()
                )));
            }
            providers.push(client);
        }

        if self.retry.is_enabled() {
            providers = providers
                .into_iter()
                .map(|inner| {
                    Arc::new(RetryingProvider::new(inner, self.retry.clone()))
                        as Arc<dyn ProviderClient>
                })
                .collect();
        }

        let ids: Vec<ProviderId> = providers.iter().map(|p| p.id()).collect();
        tracing::info!(providers = ?ids, "aggregator ready");

        Ok(Aggregator::new(
            providers,
            Arc::new(FeedCache::new(&self.cache)),
            Arc::new(self.taxonomy),
            self.call_timeout,
            self.max_limit,
        ))
    }
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
