//! The provider client contract.
//!
//! Each upstream implements [`ProviderClient`]: it translates a
//! [`ProviderQuery`] into its own URL and query-parameter dialect and returns
//! the raw records from its response envelope. Normalization, caching and
//! retries live above the client, in the [`Aggregator`](crate::Aggregator),
//! which depends only on this trait.
//!
//! # Error contract
//!
//! - Transport failure, timeout or non-2xx status → [`FeedError::ProviderUnavailable`]
//! - Body is not JSON or lacks the documented envelope → [`FeedError::ProviderSchemaMismatch`]
//! - Filters the upstream cannot express are dropped with a logged warning,
//!   never an error.
//!
//! [`FeedError::ProviderUnavailable`]: crate::FeedError::ProviderUnavailable
//! [`FeedError::ProviderSchemaMismatch`]: crate::FeedError::ProviderSchemaMismatch

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;
use crate::types::{ProviderId, ProviderQuery};

/// Default number of upstream records requested per provider call.
pub const DEFAULT_FETCH_LIMIT: usize = 100;

/// Records exactly as the upstream returned them, envelope stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProviderResponse {
    pub provider: ProviderId,
    pub records: Vec<Value>,
    /// Upstream's own total, when its envelope reports one.
    pub total: Option<u64>,
}

/// Client for one upstream feed.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Which provider this client talks to.
    fn id(&self) -> ProviderId;

    /// Provider name for logging/debugging.
    fn name(&self) -> &str {
        self.id().as_str()
    }

    /// TTL for this provider's cached listings. `None` uses the cache default.
    fn cache_ttl(&self) -> Option<Duration> {
        None
    }

    /// Size of the upstream window requested per call.
    fn fetch_limit(&self) -> usize {
        DEFAULT_FETCH_LIMIT
    }

    /// Fetch one window of raw records.
    ///
    /// No retries; a single outbound request.
    async fn fetch_raw(&self, query: &ProviderQuery) -> Result<RawProviderResponse>;
}
