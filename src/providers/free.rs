//! Client for the public, keyless room listing.
//!
//! ```text
//! GET {base}/api/public/rooms?gender=&offset=&limit=
//! → {"rooms": [...], "total": 321}   or a bare [...] array
//! ```
//!
//! Every listed room is live, so the online filter is implicit. The category
//! is sent as `gender`; tag filters are dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::http::{build_client, decode_envelope, get_json};
use super::settings::ProviderSettings;
use super::traits::{ProviderClient, RawProviderResponse};
use crate::Result;
use crate::types::{ProviderId, ProviderQuery};

/// Default listing TTL: the free feed only lists rooms that are live now.
const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Client for the public room listing.
#[derive(Clone)]
pub struct FreeClient {
    http: Client,
    settings: ProviderSettings,
}

impl FreeClient {
    /// Create a client; fails only if the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(settings.timeout)?,
            settings,
        })
    }

    fn params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        if !query.tags.is_empty() {
            warn!(
                provider = "free",
                tags = ?query.tags,
                "tag filter not supported by provider; dropping"
            );
        }
        vec![
            ("gender", query.category.clone()),
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
        ]
    }
}

/// Accept both the wrapped and the bare-array response shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped {
        rooms: Vec<Value>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<Value>),
}

#[async_trait]
impl ProviderClient for FreeClient {
    fn id(&self) -> ProviderId {
        ProviderId::Free
    }

    fn cache_ttl(&self) -> Option<Duration> {
        Some(self.settings.cache_ttl.unwrap_or(DEFAULT_TTL))
    }

    fn fetch_limit(&self) -> usize {
        self.settings.fetch_limit
    }

    async fn fetch_raw(&self, query: &ProviderQuery) -> Result<RawProviderResponse> {
        let url = format!("{}/api/public/rooms", self.settings.base_url);
        let body = get_json(&self.http, self.id(), &url, &self.params(query)).await?;

        let (records, total) = match decode_envelope(self.id(), body)? {
            Envelope::Wrapped { rooms, total } => (rooms, total),
            Envelope::Bare(rooms) => (rooms, None),
        };
        Ok(RawProviderResponse {
            provider: self.id(),
            records,
            total,
        })
    }
}
