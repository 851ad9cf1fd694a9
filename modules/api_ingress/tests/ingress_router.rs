//! Routes and limits contributed by the ingress around an application router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use tower::util::ServiceExt;

use api_ingress::{ApiIngress, ApiIngressConfig};

async fn echo(body: String) -> String {
    body
}

fn app() -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/echo", post(echo))
        .fallback(|| async { (StatusCode::NOT_FOUND, "custom not found") })
}

fn ingress(body_limit_bytes: usize) -> Router {
    ApiIngress::new(ApiIngressConfig {
        request_timeout_secs: 5,
        body_limit_bytes,
    })
    .build_router(app())
}

async fn get_uri(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (status, _, body) = get_uri(ingress(1024), "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn static_assets_are_served_with_content_type() {
    let (status, content_type, body) = get_uri(ingress(1024), "/static/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/css; charset=utf-8"));
    assert!(body.contains(".hamburger-menu"));

    let (status, _, body) = get_uri(ingress(1024), "/static/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("classList.toggle(\"active\")"));

    let (status, _, _) = get_uri(ingress(1024), "/static/nope.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn application_routes_and_fallback_survive_merge() {
    let (status, _, body) = get_uri(ingress(1024), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "home");

    let (status, _, body) = get_uri(ingress(1024), "/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "custom not found");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let post = |len: usize| {
        Request::builder()
            .method("POST")
            .uri("/echo")
            .header(header::CONTENT_TYPE, "text/plain")
            .header(header::CONTENT_LENGTH, len)
            .body(Body::from("x".repeat(len)))
            .unwrap()
    };

    let ok = ingress(16).oneshot(post(8)).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let too_big = ingress(16).oneshot(post(64)).await.unwrap();
    assert_eq!(too_big.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
