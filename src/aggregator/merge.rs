//! Merging, deduplication and pagination of provider listings.

use std::collections::HashSet;
use std::sync::Arc;

use crate::types::NormalizedModel;

/// Interleave provider lists round-robin.
///
/// Takes the first listing of every provider, then the second of every
/// provider, and so on; exhausted lists are skipped. Each provider's own
/// order is preserved and the result depends only on the input order.
pub fn merge_round_robin(lists: &[Arc<Vec<NormalizedModel>>]) -> Vec<NormalizedModel> {
    let total = lists.iter().map(|l| l.len()).sum();
    let longest = lists.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut merged = Vec::with_capacity(total);
    for i in 0..longest {
        for list in lists {
            if let Some(model) = list.get(i) {
                merged.push(model.clone());
            }
        }
    }
    merged
}

/// Drop listings whose [`dedup_key`](NormalizedModel::dedup_key) was already
/// seen; the first occurrence wins.
pub fn dedupe(models: Vec<NormalizedModel>) -> Vec<NormalizedModel> {
    let mut seen = HashSet::with_capacity(models.len());
    models
        .into_iter()
        .filter(|m| seen.insert(m.dedup_key()))
        .collect()
}

/// The `offset..offset + limit` slice of `models`, clamped to its bounds.
pub fn paginate(models: &[NormalizedModel], offset: usize, limit: usize) -> Vec<NormalizedModel> {
    models.iter().skip(offset).take(limit).cloned().collect()
}
