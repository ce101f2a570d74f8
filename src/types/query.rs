//! Listing queries: the client-facing [`Query`] and the per-upstream
//! [`ProviderQuery`] derived from it.

use std::collections::BTreeSet;

use super::ProviderSelection;

/// Category slug used when a request does not name one.
pub const DEFAULT_CATEGORY: &str = "all";

/// Default page size.
pub const DEFAULT_LIMIT: usize = 24;

/// Default upper bound for `limit`; the aggregator clamps pages to its
/// configured maximum.
pub const MAX_LIMIT: usize = 100;

/// A listing request as seen by the aggregator.
///
/// `offset`/`limit` paginate the merged result and are never forwarded to
/// upstreams.
///
/// ```rust
/// # use camfeed::types::{Query, ProviderSelection, ProviderId};
/// let query = Query::new()
///     .provider(ProviderSelection::One(ProviderId::PartnerA))
///     .category("couples")
///     .tag("Outdoor")
///     .limit(0);
/// assert_eq!(query.limit, 1);
/// assert!(query.tags.contains("outdoor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub provider: ProviderSelection,
    pub category: String,
    /// Lower-cased tag filters.
    pub tags: BTreeSet<String>,
    pub offset: usize,
    pub limit: usize,
    pub online_only: bool,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            provider: ProviderSelection::All,
            category: DEFAULT_CATEGORY.to_string(),
            tags: BTreeSet::new(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            online_only: false,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, provider: ProviderSelection) -> Self {
        self.provider = provider;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into().trim().to_ascii_lowercase();
        self
    }

    /// Add a tag filter. Blank tags are ignored.
    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() {
            self.tags.insert(tag);
        }
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the page size (at least 1).
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn online_only(mut self, online_only: bool) -> Self {
        self.online_only = online_only;
        self
    }
}

/// Clamp a requested page size into `1..=max`.
pub fn clamp_limit(limit: usize, max: usize) -> usize {
    limit.clamp(1, max.max(1))
}

/// What a single provider client is asked for.
///
/// `offset`/`limit` describe the upstream window, not the caller's page.
/// `category` is already translated to the provider's own spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub category: String,
    pub tags: BTreeSet<String>,
    pub online_only: bool,
    pub offset: usize,
    pub limit: usize,
}

impl ProviderQuery {
    /// Window starting at zero with the given upstream limit.
    pub fn window(category: impl Into<String>, limit: usize) -> Self {
        Self {
            category: category.into(),
            tags: BTreeSet::new(),
            online_only: false,
            offset: 0,
            limit,
        }
    }

    /// Named parameters identifying this request, for cache keys.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let tags = self.tags.iter().cloned().collect::<Vec<_>>().join(",");
        vec![
            ("category", self.category.clone()),
            ("tags", tags),
            ("online", self.online_only.to_string()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}
