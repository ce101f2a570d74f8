//! Wiremock integration tests for the provider clients.
//!
//! Each test checks that a normalized provider query is translated into the
//! upstream's own URL/parameter dialect and that its envelope is unwrapped.

use camfeed::providers::{
    Credentials, FreeClient, PartnerAClient, PartnerBClient, ProviderClient, ProviderSettings,
};
use camfeed::{FeedError, ProviderId, ProviderQuery};
use wiremock::matchers::{header_regex, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query(category: &str, tags: &[&str], online_only: bool) -> ProviderQuery {
    let mut q = ProviderQuery::window(category, 50);
    q.tags = tags.iter().map(|t| t.to_string()).collect();
    q.online_only = online_only;
    q
}

fn partner_a(server: &MockServer) -> PartnerAClient {
    PartnerAClient::new(
        ProviderSettings::new(server.uri()),
        Credentials::new("site-1", "key-a"),
    )
    .unwrap()
}

fn partner_b(server: &MockServer) -> PartnerBClient {
    PartnerBClient::new(
        ProviderSettings::new(server.uri()),
        Credentials::new("wm-7", "key-b"),
    )
    .unwrap()
}

/// Partner `a` receives credentials, filters and a 1-based page.
#[tokio::test]
async fn partner_a_translates_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .and(query_param("site_id", "site-1"))
        .and(query_param("access_key", "key-a"))
        .and(query_param("category", "couple"))
        .and(query_param("tags", "blonde,outdoor"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "50"))
        .and(query_param("online", "1"))
        .and(header_regex("user-agent", "^camfeed/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "data": {
                "models": [{"id": 1, "username": "ann"}, {"id": 2, "username": "bea"}],
                "total": 2
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = partner_a(&server)
        .fetch_raw(&query("couple", &["outdoor", "blonde"], true))
        .await
        .expect("fetch should succeed");

    assert_eq!(response.provider, ProviderId::PartnerA);
    assert_eq!(response.records.len(), 2);
    assert_eq!(response.total, Some(2));
}

/// Empty filters are left out of the query string.
#[tokio::test]
async fn partner_a_omits_empty_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .and(query_param_is_missing("category"))
        .and(query_param_is_missing("tags"))
        .and(query_param_is_missing("online"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "data": {"models": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = partner_a(&server).fetch_raw(&query("", &[], false)).await.unwrap();
    assert!(response.records.is_empty());
    assert_eq!(response.total, None);
}

#[tokio::test]
async fn partner_a_error_status_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "error",
            "message": "invalid access key"
        })))
        .mount(&server)
        .await;

    let err = partner_a(&server).fetch_raw(&query("", &[], false)).await.unwrap_err();
    match err {
        FeedError::ProviderUnavailable { provider, reason } => {
            assert_eq!(provider, ProviderId::PartnerA);
            assert!(reason.contains("invalid access key"));
        }
        other => panic!("expected ProviderUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn partner_a_ok_without_data_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = partner_a(&server).fetch_raw(&query("", &[], false)).await.unwrap_err();
    assert!(matches!(err, FeedError::ProviderSchemaMismatch { .. }));
}

/// Partner `b` uses offset/limit, `niche` for the category, and has no tag
/// filter.
#[tokio::test]
async fn partner_b_translates_query_and_drops_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .and(query_param("wm", "wm-7"))
        .and(query_param("key", "key-b"))
        .and(query_param("niche", "couples"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .and(query_param("status", "online"))
        .and(query_param_is_missing("tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"uid": "u1", "display_name": "Cleo"}],
            "count": 40
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = partner_b(&server)
        .fetch_raw(&query("couples", &["outdoor"], true))
        .await
        .unwrap();
    assert_eq!(response.records.len(), 1);
    assert_eq!(response.total, Some(40));
}

#[tokio::test]
async fn non_2xx_is_unavailable_with_body_excerpt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = partner_b(&server).fetch_raw(&query("", &[], false)).await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("502"));
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn invalid_json_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = partner_b(&server).fetch_raw(&query("", &[], false)).await.unwrap_err();
    assert!(matches!(
        err,
        FeedError::ProviderSchemaMismatch {
            provider: ProviderId::PartnerB,
            ..
        }
    ));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn missing_envelope_field_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .mount(&server)
        .await;

    let err = partner_b(&server).fetch_raw(&query("", &[], false)).await.unwrap_err();
    assert!(matches!(err, FeedError::ProviderSchemaMismatch { .. }));
}

/// The free listing is keyless and sends the category as `gender`.
#[tokio::test]
async fn free_accepts_wrapped_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/rooms"))
        .and(query_param("gender", "f"))
        .and(query_param("limit", "50"))
        .and(query_param_is_missing("access_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rooms": [{"username": "dee"}],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FreeClient::new(ProviderSettings::new(server.uri())).unwrap();
    let response = client.fetch_raw(&query("f", &["ignored"], false)).await.unwrap();
    assert_eq!(response.records.len(), 1);
    assert_eq!(response.total, Some(1));
}

#[tokio::test]
async fn free_accepts_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/public/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"username": "dee"},
            {"username": "eve"}
        ])))
        .mount(&server)
        .await;

    let client = FreeClient::new(ProviderSettings::new(format!("{}/", server.uri()))).unwrap();
    let response = client.fetch_raw(&query("", &[], false)).await.unwrap();
    assert_eq!(response.records.len(), 2);
    assert_eq!(response.total, None);
}

#[tokio::test]
async fn unreachable_upstream_is_unavailable() {
    // Nothing listens on port 1.
    let client = FreeClient::new(ProviderSettings::new("http://127.0.0.1:1")).unwrap();
    let err = client.fetch_raw(&query("", &[], false)).await.unwrap_err();
    assert!(matches!(
        err,
        FeedError::ProviderUnavailable {
            provider: ProviderId::Free,
            ..
        }
    ));
}
