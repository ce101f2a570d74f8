//! Route handlers.
//!
//! Query strings are parsed leniently: malformed numbers fall back to their
//! defaults and unknown provider names to the configured default. Only an
//! unknown category or a query string that cannot be decoded at all (such as
//! a repeated key) is rejected.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query as QueryParams, State};
use serde::{Deserialize, Serialize};

use super::error::{ApiResponse, HttpError};
use super::state::AppState;
use crate::Category;
use crate::translate::TranslationRequest;
use crate::types::{ModelPage, ProviderId, ProviderSelection, Query, TagStat, clamp_limit};

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /models` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsParams {
    pub provider: Option<String>,
    pub category: Option<String>,
    /// Comma-separated tag filters.
    pub tags: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// 1-based page, used when `offset` is absent.
    pub page: Option<String>,
    pub online_only: Option<String>,
}

impl ModelsParams {
    /// Turn the raw query string into an aggregator [`Query`].
    pub fn to_query(&self, state: &AppState) -> Query {
        let provider = self
            .provider
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .and_then(|p| p.parse::<ProviderSelection>().ok())
            .unwrap_or(state.default_provider);

        let limit = parse_number(self.limit.as_deref())
            .map(|l| clamp_limit(l, state.limits.max_limit))
            .unwrap_or(state.limits.default_limit);

        let offset = match (
            parse_number(self.offset.as_deref()),
            parse_number(self.page.as_deref()),
        ) {
            (Some(offset), _) => offset,
            (None, Some(page)) => page.saturating_sub(1).saturating_mul(limit),
            (None, None) => 0,
        };

        let mut query = Query::new()
            .provider(provider)
            .category(self.category.as_deref().unwrap_or_default())
            .offset(offset)
            .limit(limit)
            .online_only(parse_flag(self.online_only.as_deref()));
        for tag in split_list(self.tags.as_deref()) {
            query = query.tag(tag);
        }
        query
    }
}

/// Merged, paginated listing.
pub async fn models(
    State(state): State<AppState>,
    params: Result<QueryParams<ModelsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<ModelPage>>, HttpError> {
    let QueryParams(params) = params.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let query = params.to_query(&state);
    let page = state.aggregator.fetch_models(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// The category taxonomy.
pub async fn categories(State(state): State<AppState>) -> Json<ApiResponse<Vec<Category>>> {
    ApiResponse::ok(state.aggregator.taxonomy().categories.clone())
}

/// `GET /tags/stats` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagStatsParams {
    pub category: Option<String>,
    /// Comma-separated provider names; unknown names are ignored.
    pub providers: Option<String>,
    pub skip_cache: Option<String>,
}

/// Tag popularity for a category.
pub async fn tag_stats(
    State(state): State<AppState>,
    params: Result<QueryParams<TagStatsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<TagStat>>>, HttpError> {
    let QueryParams(params) = params.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let providers: Vec<ProviderId> = split_list(params.providers.as_deref())
        .filter_map(|p| p.parse().ok())
        .collect();
    let stats = state
        .aggregator
        .tag_stats(
            params.category.as_deref(),
            &providers,
            parse_flag(params.skip_cache.as_deref()),
        )
        .await?;
    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Serialize)]
pub struct Purged {
    pub purged: bool,
}

/// Drop every cache entry.
pub async fn purge_cache(State(state): State<AppState>) -> Json<ApiResponse<Purged>> {
    state.aggregator.purge_cache();
    tracing::info!("cache purged");
    ApiResponse::ok(Purged { purged: true })
}

#[derive(Debug, Serialize)]
pub struct Translated {
    pub text: String,
}

/// Translate a piece of text through the FIFO queue.
pub async fn translate(
    State(state): State<AppState>,
    body: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Translated>>, HttpError> {
    let Json(request) = body.map_err(|e| HttpError::BadRequest(e.body_text()))?;
    let queue = state
        .translator
        .as_ref()
        .ok_or_else(|| HttpError::ServiceUnavailable("translation is not configured".into()))?;
    let text = queue.enqueue(request).await?;
    Ok(ApiResponse::ok(Translated { text }))
}

/// Fallback for unknown routes, keeping the envelope.
pub async fn not_found() -> HttpError {
    HttpError::NotFound("no such route".into())
}

fn parse_number(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
