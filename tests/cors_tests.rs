//! Cross-origin access to the API with credentials.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{create_test_app, create_test_app_with, login_request};
use tower::ServiceExt;

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/login")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() {
    let ctx = create_test_app().await;

    let response = ctx
        .app
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
    assert!(
        headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("POST")
    );
}

#[tokio::test]
async fn test_preflight_from_unknown_origin() {
    let ctx = create_test_app().await;

    let response = ctx
        .app
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_login_response_carries_cors_headers() {
    let ctx = create_test_app().await;

    let mut request = login_request("admin", "admin");
    request
        .headers_mut()
        .insert("origin", "http://localhost:3000".parse().unwrap());

    let response = ctx.app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-credentials")
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_invalid_origins_are_skipped() {
    let ctx = create_test_app_with(|config| {
        config.allowed_origins = vec![
            " https://app.example ".to_string(),
            String::new(),
            "bad\norigin".to_string(),
            "*".to_string(),
        ]
    })
    .await;

    let response = ctx
        .app
        .oneshot(preflight("https://app.example"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://app.example"
    );
}

#[tokio::test]
async fn test_wildcard_origin_is_not_honoured() {
    let ctx =
        create_test_app_with(|config| config.allowed_origins = vec!["*".to_string()]).await;

    let response = ctx
        .app
        .oneshot(preflight("http://anywhere.example"))
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}
