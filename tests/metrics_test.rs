//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;

use camfeed::providers::RawProviderResponse;
use camfeed::telemetry;
use camfeed::{CamFeed, FeedError, ProviderClient, ProviderId, ProviderQuery, Query, Result};

// ============================================================================
// Mock providers
// ============================================================================

struct StaticProvider;

#[async_trait]
impl ProviderClient for StaticProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Free
    }

    async fn fetch_raw(&self, _query: &ProviderQuery) -> Result<RawProviderResponse> {
        Ok(RawProviderResponse {
            provider: ProviderId::Free,
            records: vec![
                json!({"username": "ann"}),
                json!({"display_name": "no username"}),
            ],
            total: None,
        })
    }
}

struct FailingProvider;

#[async_trait]
impl ProviderClient for FailingProvider {
    fn id(&self) -> ProviderId {
        ProviderId::PartnerA
    }

    async fn fetch_raw(&self, _query: &ProviderQuery) -> Result<RawProviderResponse> {
        Err(FeedError::ProviderUnavailable {
            provider: ProviderId::PartnerA,
            reason: "HTTP 503".into(),
        })
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for a metric whose labels include `label = value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn upstream_call_and_cache_record_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let feed = CamFeed::builder()
                    .provider(Arc::new(StaticProvider))
                    .build()?;
                feed.fetch_models(&Query::new()).await?;
                feed.fetch_models(&Query::new()).await
            })
        })
    });
    assert_eq!(result.expect("fetch should succeed").items.len(), 1);

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_total(&snapshot, telemetry::REQUESTS_TOTAL),
        1,
        "expected one upstream call"
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "ok"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CACHE_HITS_TOTAL, "namespace", "free"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::DROPPED_RECORDS_TOTAL, "provider", "free"),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn failed_upstream_call_records_status() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let feed = CamFeed::builder()
                    .provider(Arc::new(FailingProvider))
                    .build()?;
                feed.fetch_models(&Query::new()).await
            })
        })
    });
    assert!(matches!(result, Err(FeedError::TotalFailure { .. })));

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::REQUESTS_TOTAL, "status", "unavailable"),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn retries_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let _result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let feed = CamFeed::builder()
                    .provider(Arc::new(FailingProvider))
                    .retry(
                        camfeed::RetryConfig::new()
                            .max_attempts(3)
                            .initial_delay(std::time::Duration::from_millis(1)),
                    )
                    .build()?;
                feed.fetch_models(&Query::new()).await
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 2);
    // One aggregated call, however many attempts it took.
    assert_eq!(counter_total(&snapshot, telemetry::REQUESTS_TOTAL), 1);
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let feed = CamFeed::builder()
        .provider(Arc::new(StaticProvider))
        .build()
        .unwrap();
    let _page = feed.fetch_models(&Query::new()).await.unwrap();
}
