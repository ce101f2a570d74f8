//! Tag popularity over a merged result set.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::types::{NormalizedModel, TagStat};

/// Count tag occurrences across `models`.
///
/// With a non-empty `vocabulary` only those tags are counted; otherwise
/// every observed tag is. Tags with no occurrences are omitted. The result
/// is ordered by count (descending), then tag name.
pub fn compute_tag_stats(models: &[NormalizedModel], vocabulary: &[String]) -> Vec<TagStat> {
    let vocabulary: HashSet<String> = vocabulary.iter().map(|t| t.to_lowercase()).collect();

    let mut counts: BTreeMap<&str, TagStat> = BTreeMap::new();
    for model in models {
        for tag in &model.tags {
            if !vocabulary.is_empty() && !vocabulary.contains(tag) {
                continue;
            }
            let stat = counts.entry(tag.as_str()).or_insert_with(|| TagStat {
                tag: tag.clone(),
                count: 0,
                providers: BTreeSet::new(),
            });
            stat.count += 1;
            stat.providers.insert(model.provider_origin);
        }
    }

    let mut stats: Vec<TagStat> = counts.into_values().collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    stats
}
