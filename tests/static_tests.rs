//! Serving the front-end build next to the API.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_app, create_test_app_with, request};
use tower::ServiceExt;

const INDEX: &str = "<!doctype html><title>latchkey</title>";

#[tokio::test]
async fn test_index_served_at_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
    let static_dir = dir.path().to_path_buf();

    let ctx = create_test_app_with(|config| config.static_dir = Some(static_dir)).await;

    let response = ctx.app.oneshot(request("GET", "/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body, INDEX.as_bytes());
}

#[tokio::test]
async fn test_api_takes_precedence_over_static_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
    let static_dir = dir.path().to_path_buf();

    let ctx = create_test_app_with(|config| config.static_dir = Some(static_dir)).await;

    let response = ctx
        .app
        .oneshot(request("GET", "/api/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Not authenticated");
}

#[tokio::test]
async fn test_missing_static_dir_serves_api_only() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("build");

    let ctx = create_test_app_with(|config| config.static_dir = Some(missing)).await;

    let response = ctx.app.oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_static_dir() {
    let ctx = create_test_app().await;

    let response = ctx.app.oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
