use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use counter_app::{build_router, ServerState, StatusHub};
use counter_core::{AppState, StatusView, EXPECTING_HEADLINE, OUT_OF_ORDER_HEADLINE};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

fn setup() -> (TempDir, Arc<StatusHub>, axum::Router) {
    let static_dir = TempDir::new().unwrap();
    fs::write(static_dir.path().join("counter.html"), "<html>counter</html>").unwrap();
    let hub = Arc::new(StatusHub::new(AppState::default().view()));
    let router = build_router(ServerState::new(hub.clone()), static_dir.path());
    (static_dir, hub, router)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

async fn json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

#[tokio::test]
async fn status_reports_initial_expectation() {
    let (_dir, _hub, router) = setup();
    let response = router.oneshot(get("/api/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["headline"], EXPECTING_HEADLINE);
    assert_eq!(body["count"], 0);
    assert_eq!(body["intact"], true);
}

#[tokio::test]
async fn status_follows_published_views() {
    let (_dir, hub, router) = setup();
    hub.publish(StatusView {
        headline: OUT_OF_ORDER_HEADLINE,
        count: 77,
        intact: false,
    })
    .await;

    let body = json(router.oneshot(get("/api/status")).await.unwrap()).await;
    assert_eq!(body["headline"], OUT_OF_ORDER_HEADLINE);
    assert_eq!(body["count"], 77);
    assert_eq!(body["intact"], false);
}

#[tokio::test]
async fn evaluate_resolves_notations() {
    let (_dir, _hub, router) = setup();

    let body = json(
        router
            .clone()
            .oneshot(get("/api/evaluate?expr=5%20choose%202"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["expression"], "5 choose 2");
    assert_eq!(body["result"], 10);
    assert!(body.get("error").is_none());

    // "2×3", percent-encoded.
    let body = json(
        router
            .oneshot(get("/api/evaluate?expr=2%C3%973"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["result"], 6);
}

#[tokio::test]
async fn evaluate_reports_failure_message() {
    let (_dir, _hub, router) = setup();

    let body = json(router.clone().oneshot(get("/api/evaluate?expr=hello")).await.unwrap()).await;
    assert_eq!(body["error"], "Could not evaluate expression");
    assert!(body.get("result").is_none());

    let body = json(router.oneshot(get("/api/evaluate")).await.unwrap()).await;
    assert_eq!(body["error"], "Could not evaluate expression");
}

#[tokio::test]
async fn evaluate_does_not_touch_the_status() {
    let (_dir, hub, router) = setup();
    let before = hub.current().await;
    router.oneshot(get("/api/evaluate?expr=42")).await.unwrap();
    assert_eq!(hub.current().await, before);
}

#[tokio::test]
async fn index_serves_the_counter_page() {
    let (_dir, _hub, router) = setup();
    let response = router.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<html>counter</html>");
}

#[tokio::test]
async fn event_stream_is_server_sent_events() {
    let (_dir, _hub, router) = setup();
    let response = router.oneshot(get("/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/event-stream"));
}
