use axum::{
    http::StatusCode,
    routing::get,
    Json,
    Router,
};
use chrono::{
    DateTime,
    TimeZone,
    Utc,
};
use pretty_assertions::assert_eq;
use serde_json::{
    json,
    Value,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpListener;
use tps_history_collector::{
    CollectError,
    Collector,
    InvalidPayload,
    SourceClient,
    TpsCollector,
};
use tps_history_store::{
    Bucket,
    HistoryStore,
    MemoryStore,
    Period,
    Sample,
    StoreError,
    StoreFuture,
};
use url::Url;

async fn serve(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    Url::parse(&format!("http://{addr}/tps")).unwrap()
}

async fn serve_json(body: Value) -> Url {
    serve(Router::new().route("/tps", get(move || async move { Json(body) }))).await
}

fn collector(url: Url, store: Arc<dyn HistoryStore>) -> TpsCollector {
    let source = SourceClient::new(reqwest::Client::new(), url, Duration::from_millis(500));
    TpsCollector::new(source, store)
}

struct BrokenStore;

impl HistoryStore for BrokenStore {
    fn insert(&self, _sample: Sample) -> StoreFuture<'_, ()> {
        Box::pin(async { Err(StoreError::TimestampOutOfRange(0)) })
    }

    fn buckets(&self, _period: Period, _now: DateTime<Utc>) -> StoreFuture<'_, Vec<Bucket>> {
        Box::pin(async { Err(StoreError::TimestampOutOfRange(0)) })
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn valid_payload_stores_one_row() {
    let url = serve_json(json!({
        "tps": "19.98",
        "mspt": "2.1",
        "lastUpdated": "2024-01-01T00:00:05Z",
    }))
    .await;
    let store = MemoryStore::new();

    let sample = collector(url, Arc::new(store.clone())).collect().await.unwrap();

    let expected = Sample {
        record_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap(),
        tps: 19.98,
        mspt: 2.1,
    };
    assert_eq!(sample, expected);
    assert_eq!(store.samples().await, vec![expected]);
}

#[tokio::test]
async fn every_cycle_appends_a_row() {
    let url = serve_json(json!({"tps": 20, "mspt": 1.5, "lastUpdated": "2024-01-01T00:00:05Z"})).await;
    let store = MemoryStore::new();
    let collector = collector(url, Arc::new(store.clone()));

    for _ in 0..3 {
        collector.collect().await.unwrap();
    }

    assert_eq!(store.samples().await.len(), 3);
}

#[tokio::test]
async fn nan_payload_stores_nothing() {
    let url = serve_json(json!({
        "tps": "NaN",
        "mspt": "2.1",
        "lastUpdated": "2024-01-01T00:00:05Z",
    }))
    .await;
    let store = MemoryStore::new();

    let err = collector(url, Arc::new(store.clone())).collect().await.unwrap_err();

    assert!(
        matches!(
            err,
            CollectError::InvalidData(InvalidPayload::NotANumber { field: "tps", .. })
        ),
        "{err:?}"
    );
    assert!(store.samples().await.is_empty());
}

#[tokio::test]
async fn unparseable_timestamp_stores_nothing() {
    let url = serve_json(json!({"tps": "20", "mspt": "2.1", "lastUpdated": "soon"})).await;
    let store = MemoryStore::new();

    let err = collector(url, Arc::new(store.clone())).collect().await.unwrap_err();

    assert!(matches!(err, CollectError::InvalidData(_)), "{err:?}");
    assert!(store.samples().await.is_empty());
}

#[tokio::test]
async fn error_status_is_classified() {
    let router = Router::new().route("/tps", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "restarting") }));
    let url = serve(router).await;
    let store = MemoryStore::new();

    let err = collector(url, Arc::new(store.clone())).collect().await.unwrap_err();

    assert!(
        matches!(err, CollectError::Status { status } if status == StatusCode::SERVICE_UNAVAILABLE),
        "{err:?}"
    );
    assert!(store.samples().await.is_empty());
}

#[tokio::test]
async fn non_json_body_is_a_transport_error() {
    let router = Router::new().route("/tps", get(|| async { "<html>tps: 20</html>" }));
    let url = serve(router).await;

    let err = collector(url, Arc::new(MemoryStore::new())).collect().await.unwrap_err();

    assert!(matches!(err, CollectError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = Url::parse(&format!("http://{addr}/tps")).unwrap();

    let err = collector(url, Arc::new(MemoryStore::new())).collect().await.unwrap_err();

    assert!(matches!(err, CollectError::Unreachable(_)), "{err:?}");
}

#[tokio::test]
async fn slow_source_hits_the_timeout() {
    let router = Router::new().route(
        "/tps",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"tps": 20, "mspt": 1, "lastUpdated": "2024-01-01T00:00:05Z"}))
        }),
    );
    let url = serve(router).await;

    let started = std::time::Instant::now();
    let err = collector(url, Arc::new(MemoryStore::new())).collect().await.unwrap_err();

    assert!(matches!(err, CollectError::Unreachable(_)), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn storage_failure_ends_the_cycle_only() {
    let url = serve_json(json!({"tps": 20, "mspt": 1, "lastUpdated": "2024-01-01T00:00:05Z"})).await;
    let broken = collector(url.clone(), Arc::new(BrokenStore));

    let err = broken.collect().await.unwrap_err();
    assert!(matches!(err, CollectError::Storage(_)), "{err:?}");

    // The next cycle against a working store is unaffected.
    let store = MemoryStore::new();
    collector(url, Arc::new(store.clone())).collect().await.unwrap();
    assert_eq!(store.samples().await.len(), 1);
}
