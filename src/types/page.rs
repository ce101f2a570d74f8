//! Paged aggregator output.

use serde::{Deserialize, Serialize};

use super::{NormalizedModel, ProviderId, TagStat};

/// Position of a page within the merged result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Merged, deduplicated item count.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    /// 1-based page number containing `offset`.
    pub page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: usize, offset: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            total,
            offset,
            limit,
            page: offset / limit + 1,
            total_pages: total.div_ceil(limit),
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// Result of [`Aggregator::fetch_models`](crate::Aggregator::fetch_models).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPage {
    pub items: Vec<NormalizedModel>,
    pub pagination: Pagination,
    /// Computed over the full merged set, not just `items`.
    pub tag_stats: Vec<TagStat>,
    /// Providers that were requested but failed; empty on full success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_providers: Vec<ProviderId>,
}
