//! LibreTranslate-compatible HTTP backend.
//!
//! ```text
//! POST {base}/translate
//! {"q": "...", "source": "auto", "target": "de", "format": "text", "api_key": "..."}
//! → {"translatedText": "..."}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{TranslationRequest, Translator};
use crate::providers::http::build_client;
use crate::{FeedError, Result};

/// Translation backend reached over HTTP.
pub struct HttpTranslator {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url: String = base_url.into();
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateReply {
    translated_text: String,
}

#[async_trait]
impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        "http"
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let url = format!("{}/translate", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TranslateBody {
                q: &request.text,
                source: request.source.as_deref().unwrap_or("auto"),
                target: &request.target,
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()
            .await
            .map_err(|e| FeedError::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.trim().chars().take(200).collect();
            return Err(FeedError::Translation(format!("HTTP {status}: {excerpt}")));
        }

        let reply: TranslateReply = response
            .json()
            .await
            .map_err(|e| FeedError::Translation(format!("unexpected response: {e}")))?;
        Ok(reply.translated_text)
    }
}
