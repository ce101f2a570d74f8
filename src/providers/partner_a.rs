//! Client for partner feed `a`.
//!
//! ```text
//! GET {base}/api/v1/models?site_id=&access_key=&category=&tags=t1,t2&page=&per_page=&online=1
//! → {"status": "ok", "data": {"models": [...], "total": 1234}}
//! ```
//!
//! Paging is 1-based `page`/`per_page`; the upstream window offset is
//! rounded down to a page boundary. Supports category, tag and online
//! filters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::http::{build_client, decode_envelope, get_json, schema_mismatch, unavailable};
use super::settings::{Credentials, ProviderSettings};
use super::traits::{ProviderClient, RawProviderResponse};
use crate::Result;
use crate::types::{ProviderId, ProviderQuery};

/// Client for partner feed `a`.
#[derive(Clone)]
pub struct PartnerAClient {
    http: Client,
    settings: ProviderSettings,
    credentials: Credentials,
}

impl PartnerAClient {
    /// Create a client; fails only if the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            http: build_client(settings.timeout)?,
            settings,
            credentials,
        })
    }

    /// Query parameters for one request, in the partner's dialect.
    fn params(&self, query: &ProviderQuery) -> Vec<(&'static str, String)> {
        let per_page = query.limit.max(1);
        let page = query.offset / per_page + 1;
        if query.offset % per_page != 0 {
            warn!(
                provider = "a",
                offset = query.offset,
                per_page,
                "offset not aligned to a page; rounding down"
            );
        }
        let tags = query.tags.iter().cloned().collect::<Vec<_>>().join(",");
        vec![
            ("site_id", self.credentials.site_id.clone()),
            ("access_key", self.credentials.access_key.clone()),
            ("category", query.category.clone()),
            ("tags", tags),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("online", if query.online_only { "1".into() } else { String::new() }),
        ]
    }
}

#[derive(Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Data>,
}

#[derive(Deserialize)]
struct Data {
    models: Vec<Value>,
    #[serde(default)]
    total: Option<u64>,
}

#[async_trait]
impl ProviderClient for PartnerAClient {
    fn id(&self) -> ProviderId {
        ProviderId::PartnerA
    }

    fn cache_ttl(&self) -> Option<Duration> {
        self.settings.cache_ttl
    }

    fn fetch_limit(&self) -> usize {
        self.settings.fetch_limit
    }

    async fn fetch_raw(&self, query: &ProviderQuery) -> Result<RawProviderResponse> {
        let url = format!("{}/api/v1/models", self.settings.base_url);
        let body = get_json(&self.http, self.id(), &url, &self.params(query)).await?;
        let envelope: Envelope = decode_envelope(self.id(), body)?;

        if !envelope.status.eq_ignore_ascii_case("ok") {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("status '{}'", envelope.status));
            return Err(unavailable(self.id(), message));
        }
        let data = envelope
            .data
            .ok_or_else(|| schema_mismatch(self.id(), "status ok without data"))?;

        Ok(RawProviderResponse {
            provider: self.id(),
            records: data.models,
            total: data.total,
        })
    }
}
