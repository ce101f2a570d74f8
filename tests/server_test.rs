//! Integration tests for the HTTP API.
//!
//! These tests verify that routes are wired to the aggregator and that every
//! JSON response uses the `{success, data, error}` envelope.
#![cfg(feature = "server")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use camfeed::providers::RawProviderResponse;
use camfeed::server::config::LimitsConfig;
use camfeed::server::{AppState, create_router};
use camfeed::{
    CamFeed, Category, FeedError, ProviderClient, ProviderId, ProviderQuery, ProviderSelection,
    Result, Taxonomy, TranslationQueue, TranslationRequest, Translator,
};

/// Serves `count` listings, each tagged `outdoor`, and counts calls.
struct Rooms {
    id: ProviderId,
    count: usize,
    calls: AtomicUsize,
}

impl Rooms {
    fn new(id: ProviderId, count: usize) -> Arc<Self> {
        Arc::new(Self {
            id,
            count,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProviderClient for Rooms {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn fetch_raw(&self, _query: &ProviderQuery) -> Result<RawProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let records = (1..=self.count)
            .map(|i| json!({"id": i, "uid": i, "username": format!("{}{i:02}", self.id),
                            "display_name": format!("{}{i:02}", self.id), "tags": ["outdoor"]}))
            .collect();
        Ok(RawProviderResponse {
            provider: self.id,
            records,
            total: None,
        })
    }
}

struct Down;

#[async_trait]
impl ProviderClient for Down {
    fn id(&self) -> ProviderId {
        ProviderId::PartnerB
    }

    async fn fetch_raw(&self, _query: &ProviderQuery) -> Result<RawProviderResponse> {
        Err(FeedError::ProviderUnavailable {
            provider: ProviderId::PartnerB,
            reason: "HTTP 503".into(),
        })
    }
}

struct Shout;

#[async_trait]
impl Translator for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        if request.target == "xx" {
            return Err(FeedError::Translation("unsupported language".into()));
        }
        Ok(request.text.to_uppercase())
    }
}

fn taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        Category::new("couples", "Couples").with_tags(["outdoor"]),
    ])
}

fn state_with(providers: Vec<Arc<dyn ProviderClient>>) -> AppState {
    let feed = providers
        .into_iter()
        .fold(CamFeed::builder(), |b, p| b.provider(p))
        .taxonomy(taxonomy())
        .build()
        .unwrap();
    AppState::new(Arc::new(feed))
}

fn app() -> Router {
    let state = state_with(vec![
        Rooms::new(ProviderId::PartnerA, 25),
        Rooms::new(ProviderId::Free, 3),
    ]);
    create_router(state, &[])
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn models_endpoint_returns_envelope() {
    let (status, body) = get(app(), "/models").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("error").is_none());
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 24);
    assert_eq!(data["pagination"]["total"], 28);
    assert_eq!(data["items"][0]["providerOrigin"], "a");
    assert_eq!(data["items"][1]["providerOrigin"], "free");
    assert_eq!(data["tagStats"][0]["tag"], "outdoor");
    assert_eq!(data["tagStats"][0]["count"], 28);
}

#[tokio::test]
async fn models_page_parameter_sets_offset() {
    let (status, body) = get(app(), "/models?provider=a&limit=10&page=2").await;

    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["name"], "a11");
    assert_eq!(body["data"]["pagination"]["offset"], 10);
    assert_eq!(body["data"]["pagination"]["page"], 2);
}

#[tokio::test]
async fn models_limit_is_clamped_and_junk_ignored() {
    let (_, body) = get(app(), "/models?limit=5000&offset=abc").await;
    assert_eq!(body["data"]["pagination"]["limit"], 100);
    assert_eq!(body["data"]["pagination"]["offset"], 0);

    let (_, body) = get(app(), "/models?limit=0").await;
    assert_eq!(body["data"]["pagination"]["limit"], 1);
}

#[tokio::test]
async fn configured_max_limit_raises_the_page_cap() {
    let feed = CamFeed::builder()
        .provider(Rooms::new(ProviderId::Free, 250))
        .max_limit(200)
        .build()
        .unwrap();
    let state = AppState::new(Arc::new(feed)).with_limits(LimitsConfig {
        default_limit: 24,
        max_limit: 200,
    });
    let router = create_router(state, &[]);

    let (status, body) = get(router.clone(), "/models?limit=150").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["limit"], 150);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 150);

    let (_, body) = get(router, "/models?limit=500").await;
    assert_eq!(body["data"]["pagination"]["limit"], 200);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 200);
}

#[tokio::test]
async fn malformed_query_string_uses_envelope() {
    let (status, body) = get(app(), "/models?limit=1&limit=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("duplicate field"));

    let (status, body) = get(app(), "/tags/stats?category=a&category=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_provider_falls_back_to_default() {
    let (status, body) = get(app(), "/models?provider=zzz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 28);
}

#[tokio::test]
async fn configured_default_provider_applies() {
    let state = state_with(vec![
        Rooms::new(ProviderId::PartnerA, 2),
        Rooms::new(ProviderId::Free, 3),
    ])
    .with_default_provider(ProviderSelection::One(ProviderId::Free))
    .with_limits(LimitsConfig {
        default_limit: 2,
        max_limit: 50,
    });

    let (_, body) = get(create_router(state, &[]), "/models").await;
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_category_is_bad_request() {
    let (status, body) = get(app(), "/models?category=nope").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("nope"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn total_failure_is_service_unavailable() {
    let app = create_router(state_with(vec![Arc::new(Down)]), &[]);
    let (status, body) = get(app, "/models").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn partial_failure_is_reported() {
    let app = create_router(
        state_with(vec![
            Arc::new(Down),
            Rooms::new(ProviderId::Free, 3),
        ]),
        &[],
    );
    let (status, body) = get(app, "/models").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["failedProviders"], json!(["b"]));
}

#[tokio::test]
async fn categories_endpoint_lists_taxonomy() {
    let (status, body) = get(app(), "/categories").await;

    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["all", "couples"]);
}

#[tokio::test]
async fn tag_stats_endpoint() {
    let (status, body) = get(app(), "/tags/stats?category=couples&providers=free,zzz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["tag"], "outdoor");
    assert_eq!(body["data"][0]["count"], 3);
    assert_eq!(body["data"][0]["providers"], json!(["free"]));

    let (status, _) = get(app(), "/tags/stats?skipCache=true").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn purge_cache_endpoint() {
    let rooms = Rooms::new(ProviderId::Free, 3);
    let app = create_router(state_with(vec![rooms.clone()]), &[]);

    get(app.clone(), "/models").await;
    get(app.clone(), "/models").await;
    assert_eq!(rooms.calls.load(Ordering::SeqCst), 1);

    let (status, body) = send(app.clone(), "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["purged"], true);

    get(app, "/models").await;
    assert_eq!(rooms.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn translate_without_backend_is_service_unavailable() {
    let (status, body) = send(
        app(),
        "POST",
        "/translate",
        Some(json!({"text": "hallo", "target": "en"})),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn translate_goes_through_the_queue() {
    let state = state_with(vec![Rooms::new(ProviderId::Free, 1)])
    .with_translator(TranslationQueue::new(Arc::new(Shout)));
    let app = create_router(state, &[]);

    let (status, body) = send(
        app.clone(),
        "POST",
        "/translate",
        Some(json!({"text": "hello", "target": "de", "source": "en"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "HELLO");

    let (status, _) = send(
        app.clone(),
        "POST",
        "/translate",
        Some(json!({"text": "hello", "target": "xx"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, body) = send(app.clone(), "POST", "/translate", Some(json!({"text": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        app,
        "POST",
        "/translate",
        Some(json!({"text": " ", "target": "de"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nonexistent_route_returns_not_found() {
    let (status, body) = get(app(), "/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
