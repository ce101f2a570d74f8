//! Client for partner feed `b`.
//!
//! ```text
//! GET {base}/feed?wm=&key=&niche=&offset=&limit=&status=online
//! → {"results": [...], "count": 1234}
//! ```
//!
//! Supports category (`niche`) and online filters. The feed has no tag
//! filter; tag filters are dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::http::{build_client, decode_envelope, get_json};
use super::settings::{Credentials, ProviderSettings};
use super::traits::{ProviderClient, RawProviderResponse};
use crate::Result;
use crate::types::{ProviderId, ProviderQuery};

/// Client for partner feed `b`.
#[derive(Clone)]
pub struct PartnerBClient {
    http: Client,
    settings: ProviderSettings,
    credentials: Credentials,
}

impl PartnerBClient {
    /// Create a client; fails only if the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            http: build_client(settings.timeout)?,
            settings,
            credentials,
        })
    }

    fn params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        if !query.tags.is_empty() {
            warn!(
                provider = "b",
                tags = ?query.tags,
                "tag filter not supported by provider; dropping"
            );
        }
        vec![
            ("wm", self.credentials.site_id.clone()),
            ("key", self.credentials.access_key.clone()),
            ("niche", query.category.clone()),
            ("offset", query.offset.to_string()),
            ("limit", query.limit.to_string()),
            (
                "status",
                if query.online_only { "online".into() } else { String::new() },
            ),
        ]
    }
}

#[derive(Deserialize)]
struct Envelope {
    results: Vec<Value>,
    #[serde(default)]
    count: Option<u64>,
}

#[async_trait]
impl ProviderClient for PartnerBClient {
    fn id(&self) -> ProviderId {
        ProviderId::PartnerB
    }

    fn cache_ttl(&self) -> Option<Duration> {
        self.settings.cache_ttl
    }

    fn fetch_limit(&self) -> usize {
        self.settings.fetch_limit
    }

    async fn fetch_raw(&self, query: &ProviderQuery) -> Result<RawProviderResponse> {
        let url = format!("{}/feed", self.settings.base_url);
        let body = get_json(&self.http, self.id(), &url, &self.params(query)).await?;
        let envelope: Envelope = decode_envelope(self.id(), body)?;

        Ok(RawProviderResponse {
            provider: self.id(),
            records: envelope.results,
            total: envelope.count,
        })
    }
}
