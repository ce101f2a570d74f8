//! Fan-out, merge and pagination over the registered providers.
//!
//! The [`Aggregator`] owns the provider clients, the [`FeedCache`] and the
//! category [`Taxonomy`]. A listing request fans out to every selected
//! provider concurrently; each provider's normalized window is read through
//! the cache, the windows are merged round-robin and deduplicated, tag
//! statistics are counted over the whole merged set, and only then is the
//! caller's page cut out.
//!
//! Upstream calls always request the provider's full window starting at
//! zero, so every page of one query is served from the same cache entries.

mod builder;
pub mod merge;
pub mod stats;

pub use builder::{AggregatorBuilder, CamFeed, DEFAULT_CALL_TIMEOUT};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tracing::{debug, error, instrument, warn};

use crate::cache::{CachedValue, FeedCache, cache_key};
use crate::catalog::Taxonomy;
use crate::normalize::normalize_batch;
use crate::providers::ProviderClient;
use crate::telemetry;
use crate::types::{
    ModelPage, NormalizedModel, Pagination, ProviderId, ProviderQuery, Query, TagStat, clamp_limit,
};
use crate::{FeedError, Result};

use merge::{dedupe, merge_round_robin, paginate};
use stats::compute_tag_stats;

/// Cache namespace for merged tag statistics.
const STATS_NAMESPACE: &str = "stats";

/// Per-provider windows gathered by one fan-out.
struct Collected {
    /// Successful listings, in provider registration order.
    lists: Vec<Arc<Vec<NormalizedModel>>>,
    failed: Vec<ProviderId>,
}

/// Multi-provider listing aggregator.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Aggregator {
    providers: Vec<Arc<dyn ProviderClient>>,
    cache: Arc<FeedCache>,
    taxonomy: Arc<Taxonomy>,
    call_timeout: Duration,
    max_limit: usize,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("providers", &self.provider_ids())
            .field("call_timeout", &self.call_timeout)
            .field("max_limit", &self.max_limit)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    pub(crate) fn new(
        providers: Vec<Arc<dyn ProviderClient>>,
        cache: Arc<FeedCache>,
        taxonomy: Arc<Taxonomy>,
        call_timeout: Duration,
        max_limit: usize,
    ) -> Self {
        Self {
            providers,
            cache,
            taxonomy,
            call_timeout,
            max_limit,
        }
    }

    /// Largest page [`fetch_models`](Self::fetch_models) returns.
    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Registered providers, in merge order.
    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    /// Fetch one page of the merged listing.
    ///
    /// Providers that fail are reported in [`ModelPage::failed_providers`];
    /// the call only fails with [`FeedError::TotalFailure`] when every
    /// selected provider failed. An unknown category is a
    /// [`FeedError::Validation`] error.
    #[instrument(skip(self, query), fields(
        provider = %query.provider,
        category = %query.category,
        offset = query.offset,
        limit = query.limit,
    ))]
    pub async fn fetch_models(&self, query: &Query) -> Result<ModelPage> {
        let category = self.taxonomy.resolve(Some(&query.category))?;
        let selected = self.select(|id| query.provider.includes(id))?;

        let collected = self
            .collect(&selected, &category.slug, &query.tags, query.online_only)
            .await?;
        let merged = dedupe(merge_round_robin(&collected.lists));
        let tag_stats = compute_tag_stats(&merged, &category.tags);

        let limit = clamp_limit(query.limit, self.max_limit);
        let items = paginate(&merged, query.offset, limit);
        debug!(
            merged = merged.len(),
            returned = items.len(),
            failed = collected.failed.len(),
            "listing assembled"
        );

        Ok(ModelPage {
            pagination: Pagination::new(merged.len(), query.offset, limit),
            items,
            tag_stats,
            failed_providers: collected.failed,
        })
    }

    /// Tag popularity for a category across `providers` (all registered
    /// providers when empty).
    ///
    /// Results are cached for the configured stats TTL, but only when every
    /// provider answered. `skip_cache` drops the cached statistics and the
    /// provider listings behind them before recomputing.
    #[instrument(skip(self, providers), fields(category = category.unwrap_or_default()))]
    pub async fn tag_stats(
        &self,
        category: Option<&str>,
        providers: &[ProviderId],
        skip_cache: bool,
    ) -> Result<Vec<TagStat>> {
        let category = self.taxonomy.resolve(category)?;
        let selected = self.select(|id| providers.is_empty() || providers.contains(&id))?;

        let provider_list = selected
            .iter()
            .map(|p| p.id().as_str())
            .collect::<Vec<_>>()
            .join(",");
        let key = cache_key(
            STATS_NAMESPACE,
            &[
                ("category", category.slug.as_str()),
                ("providers", provider_list.as_str()),
            ],
        );

        let no_tags = BTreeSet::new();
        if skip_cache {
            self.cache.invalidate(&key).await;
            for provider in &selected {
                let pq = self.provider_query(provider.as_ref(), &category.slug, &no_tags, false);
                self.cache.invalidate(&listing_key(provider.id(), &pq)).await;
            }
        } else if let Some(CachedValue::TagStats(stats)) = self.cache.get(&key).await {
            return Ok(stats.as_ref().clone());
        }

        let collected = self
            .collect(&selected, &category.slug, &no_tags, false)
            .await?;
        let merged = dedupe(merge_round_robin(&collected.lists));
        let stats = compute_tag_stats(&merged, &category.tags);

        if collected.failed.is_empty() {
            let ttl = self.cache.config().stats_ttl;
            self.cache
                .set(key, CachedValue::TagStats(Arc::new(stats.clone())), ttl)
                .await;
        }
        Ok(stats)
    }

    /// Drop the cached listing one provider holds for `query`.
    ///
    /// Unregistered providers are ignored.
    pub async fn invalidate(&self, provider: ProviderId, query: &Query) -> Result<()> {
        let category = self.taxonomy.resolve(Some(&query.category))?;
        if let Some(client) = self.providers.iter().find(|p| p.id() == provider) {
            let pq = self.provider_query(
                client.as_ref(),
                &category.slug,
                &query.tags,
                query.online_only,
            );
            self.cache.invalidate(&listing_key(provider, &pq)).await;
        }
        Ok(())
    }

    /// Drop every cached listing and statistic.
    pub fn purge_cache(&self) {
        self.cache.purge();
    }

    fn select(
        &self,
        wanted: impl Fn(ProviderId) -> bool,
    ) -> Result<Vec<Arc<dyn ProviderClient>>> {
        let selected: Vec<_> = self
            .providers
            .iter()
            .filter(|p| wanted(p.id()))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(FeedError::NoProvider);
        }
        Ok(selected)
    }

    /// The upstream request for one provider: translated category, full
    /// window from zero.
    fn provider_query(
        &self,
        provider: &dyn ProviderClient,
        slug: &str,
        tags: &BTreeSet<String>,
        online_only: bool,
    ) -> ProviderQuery {
        let mut pq = ProviderQuery::window(
            self.taxonomy.provider_category(slug, provider.id()),
            provider.fetch_limit(),
        );
        pq.tags = tags.clone();
        pq.online_only = online_only;
        pq
    }

    /// Fan out to `providers` concurrently and split successes from failures.
    async fn collect(
        &self,
        providers: &[Arc<dyn ProviderClient>],
        slug: &str,
        tags: &BTreeSet<String>,
        online_only: bool,
    ) -> Result<Collected> {
        let calls = providers.iter().map(|provider| {
            let pq = self.provider_query(provider.as_ref(), slug, tags, online_only);
            async move {
                let result = self.provider_listing(provider.as_ref(), &pq).await;
                (provider.id(), result)
            }
        });

        let mut collected = Collected {
            lists: Vec::with_capacity(providers.len()),
            failed: Vec::new(),
        };
        for (id, result) in join_all(calls).await {
            match result {
                Ok(models) => collected.lists.push(models),
                Err(e @ FeedError::ProviderSchemaMismatch { .. }) => {
                    error!(provider = %id, error = %e, "provider payload rejected");
                    collected.failed.push(id);
                }
                Err(e) => {
                    warn!(provider = %id, error = %e, "provider unavailable");
                    collected.failed.push(id);
                }
            }
        }

        if collected.lists.is_empty() {
            return Err(FeedError::TotalFailure {
                providers: collected.failed,
            });
        }
        Ok(collected)
    }

    /// A provider's normalized window, read through the cache.
    async fn provider_listing(
        &self,
        provider: &dyn ProviderClient,
        pq: &ProviderQuery,
    ) -> Result<Arc<Vec<NormalizedModel>>> {
        let key = listing_key(provider.id(), pq);
        let ttl = provider
            .cache_ttl()
            .unwrap_or(self.cache.config().default_ttl);

        let value = self
            .cache
            .get_or_try_insert_with(&key, ttl, async {
                let models = self.fetch_normalized(provider, pq).await?;
                Ok(CachedValue::Models(Arc::new(models)))
            })
            .await?;

        match value {
            CachedValue::Models(models) => Ok(models),
            CachedValue::TagStats(_) => Err(FeedError::Configuration(format!(
                "cache entry {key} does not hold a listing"
            ))),
        }
    }

    /// One upstream call, bounded by the call timeout, then normalization.
    async fn fetch_normalized(
        &self,
        provider: &dyn ProviderClient,
        pq: &ProviderQuery,
    ) -> Result<Vec<NormalizedModel>> {
        let id = provider.id();
        let start = Instant::now();
        let result = match tokio::time::timeout(self.call_timeout, provider.fetch_raw(pq)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::ProviderUnavailable {
                provider: id,
                reason: format!("no response within {}ms", self.call_timeout.as_millis()),
            }),
        };
        Self::record_request(id, start, &result);

        let raw = result?;
        let (models, dropped) = normalize_batch(id, &raw.records);
        debug!(
            provider = %id,
            records = raw.records.len(),
            upstream_total = raw.total,
            dropped,
            "upstream window normalized"
        );
        Ok(models)
    }

    /// Record upstream call metrics (counter + histogram).
    fn record_request<T>(provider: ProviderId, start: Instant, result: &Result<T>) {
        let status = match result {
            Ok(_) => "ok",
            Err(FeedError::ProviderUnavailable { .. }) => "unavailable",
            Err(FeedError::ProviderSchemaMismatch { .. }) => "schema_mismatch",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.as_str(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => provider.as_str(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}

/// Cache key of one provider's listing window.
fn listing_key(provider: ProviderId, pq: &ProviderQuery) -> String {
    cache_key(provider.as_str(), &pq.params())
}
