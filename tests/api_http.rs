// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/sources
// - GET /api/dashboard (fallback label, source selection, tables)
// - POST /admin/sweep
// - store outage → 503
// - GET /metrics

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{at, sources, FlakyStore};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use tari_dashboard::config::DashboardCfg;
use tari_dashboard::dashboard::{Dashboard, Stopwords};
use tari_dashboard::store::ArticleStore;
use tari_dashboard::{api, AppState, Article, RuleSet, Tagger};

const BODY_LIMIT: usize = 1024 * 1024;

fn corpus() -> Vec<Article> {
    vec![
        Article::new("https://detik.com/a", at(2024, 5, 10, 9, 0))
            .with_source("detik")
            .with_text("Tari Saman memukau", "Penampilan tari saman dan tari kecak."),
        Article::new("https://kompas.tv/b", at(2024, 3, 2, 9, 0))
            .with_source("kompas-tv")
            .with_text("Festival budaya", "Tari jaipong hadir di festival budaya."),
        // Untagged: displayed under the fallback label, which is not allowed.
        Article::new("https://blog.example/c", at(2024, 3, 3, 9, 0))
            .with_text("Tari reog", "tari reog tari reog"),
        Article::new("https://detik.com/d", at(2024, 5, 20, 9, 0)),
    ]
}

fn app(store: Arc<FlakyStore>) -> Router {
    let tagger = Arc::new(Tagger::new(store.clone(), RuleSet::builtin(), Duration::from_secs(5)));
    let dashboard = Arc::new(Dashboard::with_stopwords(
        store,
        DashboardCfg::default(),
        Stopwords::builtin(),
    ));
    api::router(AppState {
        dashboard,
        tagger,
        metrics: None,
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&bytes).expect("parse json"))
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = app(Arc::new(FlakyStore::new(vec![])))
        .oneshot(req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn sources_lists_allowed_display_sources() {
    let (status, v) = get_json(app(Arc::new(FlakyStore::new(corpus()))), "/api/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!(["detik", "kompas-tv"]));
}

#[tokio::test]
async fn dashboard_builds_all_three_tables() {
    let store = Arc::new(FlakyStore::new(corpus()));
    let (status, v) = get_json(app(store.clone()), "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK, "{v}");

    assert_eq!(v["total"], 2);
    assert_eq!(v["selected"], serde_json::json!(["kompas-tv", "detik"]));
    assert_eq!(
        v["monthly"],
        serde_json::json!([
            {"month": "March", "count": 1},
            {"month": "May", "count": 1}
        ])
    );

    let dances = v["dances"].as_array().expect("dances");
    assert_eq!(dances[0], serde_json::json!({"term": "saman", "count": 2}));
    assert!(dances.iter().all(|d| d["term"] != "reog"));

    let words = v["words"].as_array().expect("words");
    assert_eq!(words[0], serde_json::json!({"term": "tari", "count": 4}));
    assert!(words.iter().all(|w| w["term"] != "dan"));

    // Fallback is display-only.
    let docs = store.find_all().await.unwrap();
    assert_eq!(sources(&docs)[2], None);
}

#[tokio::test]
async fn dashboard_respects_source_selection() {
    let (status, v) = get_json(
        app(Arc::new(FlakyStore::new(corpus()))),
        "/api/dashboard?sources=kompas-tv",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["total"], 1);
    assert_eq!(v["available"], serde_json::json!(["detik", "kompas-tv"]));
    assert_eq!(v["dances"], serde_json::json!([{"term": "jaipong", "count": 1}]));
}

#[tokio::test]
async fn dashboard_without_text_fields_has_no_text_tables() {
    let bare = vec![Article::new("https://detik.com/x", at(2024, 1, 5, 0, 0)).with_source("detik")];
    let (status, v) = get_json(app(Arc::new(FlakyStore::new(bare))), "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["words"].is_null());
    assert!(v["dances"].is_null());
    assert_eq!(v["monthly"], serde_json::json!([{"month": "January", "count": 1}]));
}

#[tokio::test]
async fn store_outage_is_503() {
    let store = Arc::new(FlakyStore::new(corpus()));
    store.set_offline(true);
    let (status, v) = get_json(app(store), "/api/dashboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(v["retryable"], true);
}

#[tokio::test]
async fn manual_sweep_tags_and_reports() {
    let store = Arc::new(FlakyStore::new(corpus()));
    let req = Request::builder()
        .method("POST")
        .uri("/admin/sweep")
        .body(Body::empty())
        .unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["total"], 1);

    let docs = store.find_all().await.unwrap();
    assert_eq!(sources(&docs)[3], Some("detik"));
    assert_eq!(sources(&docs)[2], None);
}

#[tokio::test]
async fn metrics_served_only_with_a_recorder() {
    let req = || Request::builder().uri("/metrics").body(Body::empty()).unwrap();

    let resp = app(Arc::new(FlakyStore::new(vec![]))).oneshot(req()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let store = Arc::new(FlakyStore::new(corpus()));
    let tagger = Arc::new(Tagger::new(store.clone(), RuleSet::builtin(), Duration::from_secs(5)));
    let dashboard = Arc::new(Dashboard::with_stopwords(
        store,
        DashboardCfg::default(),
        Stopwords::builtin(),
    ));
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let with_metrics = api::router(AppState {
        dashboard,
        tagger,
        metrics: Some(handle),
    });
    let resp = with_metrics.oneshot(req()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
