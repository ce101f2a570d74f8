//! Connection settings shared by the provider clients.

use std::time::Duration;

use super::http::DEFAULT_TIMEOUT;
use super::traits::DEFAULT_FETCH_LIMIT;

/// Where and how to reach one upstream.
///
/// ```rust
/// # use camfeed::providers::ProviderSettings;
/// # use std::time::Duration;
/// let settings = ProviderSettings::new("https://feed.example.com")
///     .timeout(Duration::from_secs(5))
///     .cache_ttl(Duration::from_secs(60))
///     .fetch_limit(200);
/// assert_eq!(settings.fetch_limit, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Per-request timeout. Default: 10s.
    pub timeout: Duration,
    /// Listing TTL override; `None` uses the cache default.
    pub cache_ttl: Option<Duration>,
    /// Records requested per upstream call. Default: 100.
    pub fetch_limit: usize,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: None,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit.max(1);
        self
    }
}

/// Access credentials for the commercial feeds, sent as query parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Site / webmaster id.
    pub site_id: String,
    pub access_key: String,
}

impl Credentials {
    pub fn new(site_id: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            access_key: access_key.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("site_id", &self.site_id)
            .field("access_key", &"<redacted>")
            .finish()
    }
}
