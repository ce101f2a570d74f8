//! Tag popularity statistics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// How often a tag occurs across a merged result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    pub tag: String,
    pub count: usize,
    /// Providers that contributed at least one listing with this tag.
    pub providers: BTreeSet<ProviderId>,
}
