//! Shared HTTP plumbing for provider clients.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::types::ProviderId;
use crate::{FeedError, Result};

/// Client identifier sent with every upstream request.
pub const USER_AGENT: &str = concat!("camfeed/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for upstream calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest slice of an error body quoted in error messages.
const BODY_EXCERPT_LEN: usize = 200;

/// Build a reqwest client with a bounded timeout and our user agent.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FeedError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// GET `url` with query `params` and parse the body as JSON.
///
/// Empty parameter values are left out of the query string.
pub(crate) async fn get_json(
    http: &Client,
    provider: ProviderId,
    url: &str,
    params: &[(&str, String)],
) -> Result<Value> {
    let params: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();

    let response = http
        .get(url)
        .query(&params)
        .send()
        .await
        .map_err(|e| unavailable(provider, describe_transport_error(&e)))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| unavailable(provider, format!("failed to read body: {e}")))?;

    if !status.is_success() {
        return Err(unavailable(provider, status_reason(status, &body)));
    }

    serde_json::from_slice(&body)
        .map_err(|e| schema_mismatch(provider, format!("body is not valid JSON: {e}")))
}

/// Decode a JSON body into a provider's envelope type.
pub(crate) fn decode_envelope<T>(provider: ProviderId, body: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(body)
        .map_err(|e| schema_mismatch(provider, format!("unexpected envelope: {e}")))
}

pub(crate) fn unavailable(provider: ProviderId, reason: impl Into<String>) -> FeedError {
    FeedError::ProviderUnavailable {
        provider,
        reason: reason.into(),
    }
}

pub(crate) fn schema_mismatch(provider: ProviderId, reason: impl Into<String>) -> FeedError {
    FeedError::ProviderSchemaMismatch {
        provider,
        reason: reason.into(),
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("request failed: {e}")
    }
}

fn status_reason(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let excerpt: String = text.trim().chars().take(BODY_EXCERPT_LEN).collect();
    if excerpt.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {excerpt}")
    }
}
