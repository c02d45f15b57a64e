// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, backed by the
// captured Google News fixture instead of the network.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as _; // for `oneshot`

use chokepoint_sentinel::ingest::providers::GoogleNewsFetcher;
use chokepoint_sentinel::{router, AppState, SentinelConfig};

const FIXTURE: &str = include_str!("fixtures/google_news_red_sea.xml");
const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let fetcher = Arc::new(GoogleNewsFetcher::from_fixture(FIXTURE));
    let state = AppState::new(SentinelConfig::default(), fetcher).expect("state");
    router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, v)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build POST")
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_router();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn targets_lists_seed_targets_and_windows() {
    let app = test_router();
    let (status, v) = send(&app, get("/targets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["targets"].as_array().unwrap().len(), 6);
    assert_eq!(v["default_window"], "Last 7 Days");
    assert!(v["windows"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w == "Past 1 Year"));
}

#[tokio::test]
async fn results_before_any_scan_are_idle() {
    let app = test_router();
    let (status, v) = send(&app, get("/results")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "idle");
    assert!(v.get("items").is_none());
}

#[tokio::test]
async fn scan_rejects_unknown_target_window_and_sort() {
    let app = test_router();

    let (status, v) = send(&app, post("/scan", json!({ "target": "Atlantis" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(v["error"].as_str().unwrap().contains("Atlantis"));

    let (status, _) = send(
        &app,
        post("/scan", json!({ "target": "Taiwan Strait", "window": "Eon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post("/scan", json!({ "target": "Taiwan Strait", "sort": "random" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // nothing was published
    let (_, v) = send(&app, get("/results")).await;
    assert_eq!(v["status"], "idle");
}

#[tokio::test]
async fn scan_then_browse_results() {
    let app = test_router();

    let (status, v) = send(
        &app,
        post("/scan", json!({ "target": "red sea / suez", "sort": "severity" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{v}");
    assert_eq!(v["status"], "ok");
    assert_eq!(v["published"], true);
    assert_eq!(v["target"], "Red Sea / Suez");
    assert_eq!(v["window"], "Last 7 Days");
    assert_eq!(v["total"], 6);
    assert_eq!(v["by_risk"]["critical"], 1);
    assert_eq!(v["stats"]["excluded"], 1);
    assert_eq!(v["stats"]["duplicates"], 1);

    let (_, page0) = send(&app, get("/results")).await;
    assert_eq!(page0["status"], "ok");
    assert_eq!(page0["per_page"], 5);
    assert_eq!(page0["total_pages"], 2);
    assert_eq!(page0["items"].as_array().unwrap().len(), 5);
    assert_eq!(page0["items"][0]["risk"], "HIGH");
    assert_eq!(page0["items"][1]["risk"], "CRITICAL");
    assert_eq!(page0["items"][1]["matched_phrase"], "drone strike");

    let (_, page1) = send(&app, get("/results?page=1")).await;
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["items"].as_array().unwrap().len(), 1);

    let (_, crit) = send(&app, get("/results?risk=critical&per_page=10")).await;
    assert_eq!(crit["filter"], "CRITICAL");
    assert_eq!(crit["matched"], 1);
    assert_eq!(crit["total_before_filter"], 6);
    assert_eq!(crit["per_page"], 10);

    let (_, out_of_range) = send(&app, get("/results?page=42")).await;
    assert_eq!(out_of_range["page"], 0);

    let (status, _) = send(&app, get("/results?risk=SEVERE")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sliced_window_scan_through_http() {
    let app = test_router();

    let (status, v) = send(
        &app,
        post(
            "/scan",
            json!({ "target": "Red Sea / Suez", "window": "Past 1 Month", "sort": "recency" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{v}");
    assert_eq!(v["window"], "Past 1 Month");
    assert_eq!(v["sort"], "by_recency");
    assert_eq!(v["stats"]["slices"], 3);
    assert_eq!(v["stats"]["failed_slices"], 0);
    // the fixture is served for every slice: 3 × 8 entries, 3 × cricket excluded
    assert_eq!(v["stats"]["raw_entries"], 24);
    assert_eq!(v["stats"]["excluded"], 3);
    assert_eq!(v["stats"]["duplicates"], 15);
    assert_eq!(v["total"], 6);

    let (_, r) = send(&app, get("/results?per_page=10")).await;
    assert_eq!(r["window"], "Past 1 Month");
    assert_eq!(r["items"][0]["date"], "2026-10-16");
    assert_eq!(r["items"][5]["date"], "unknown");
}

#[tokio::test]
async fn scan_with_nothing_left_reports_empty() {
    let xml = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Cricket final tonight</title><link>https://n/1</link></item>
</channel></rss>"#;
    let state = AppState::new(
        SentinelConfig::default(),
        Arc::new(GoogleNewsFetcher::from_fixture(xml)),
    )
    .unwrap();
    let app = router(state);

    let (status, v) = send(&app, post("/scan", json!({ "target": "Indian Ocean" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "empty");

    let (_, r) = send(&app, get("/results")).await;
    assert_eq!(r["status"], "empty");
    assert_eq!(r["matched"], 0);
    assert_eq!(r["total_pages"], 1);
}

#[tokio::test]
async fn classify_single_headline() {
    let app = test_router();
    let (status, v) = send(
        &app,
        post(
            "/classify",
            json!({ "title": "Port blocked after collision at sea near Suez" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["risk"], "CRITICAL");
    assert_eq!(v["date"], "unknown");
    assert_eq!(v["source"], "Google News");

    let (status, _) = send(&app, post("/classify", json!({ "title": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
