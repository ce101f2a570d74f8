//! Upstream provider identifiers and request-level provider selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FeedError;

/// An upstream feed provider.
///
/// The declaration order is the merge order used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Commercial partner feed `a` (site id + access key).
    #[serde(rename = "a")]
    PartnerA,
    /// Commercial partner feed `b` (webmaster id + key).
    #[serde(rename = "b")]
    PartnerB,
    /// Public keyless room listing.
    Free,
}

impl ProviderId {
    /// All known providers, in merge order.
    pub const ALL: [ProviderId; 3] = [ProviderId::PartnerA, ProviderId::PartnerB, ProviderId::Free];

    /// Wire name used in query strings, cache keys and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::PartnerA => "a",
            ProviderId::PartnerB => "b",
            ProviderId::Free => "free",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(ProviderId::PartnerA),
            "b" => Ok(ProviderId::PartnerB),
            "free" => Ok(ProviderId::Free),
            other => Err(FeedError::Validation(format!("unknown provider '{other}'"))),
        }
    }
}

/// Which providers a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderSelection {
    /// A single provider.
    One(ProviderId),
    /// Fan out to every registered provider.
    #[default]
    All,
}

impl ProviderSelection {
    /// Whether `provider` is part of this selection.
    pub fn includes(&self, provider: ProviderId) -> bool {
        match self {
            ProviderSelection::One(p) => *p == provider,
            ProviderSelection::All => true,
        }
    }
}

impl fmt::Display for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSelection::One(p) => p.fmt(f),
            ProviderSelection::All => f.write_str("all"),
        }
    }
}

impl FromStr for ProviderSelection {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ProviderSelection::All);
        }
        s.parse().map(ProviderSelection::One)
    }
}
