#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use latchkey::{
    ServerConfig,
    bootstrap::ensure_default_user,
    create_app,
    db::Database,
    jwt::{JwtConfig, TokenLifetimes},
    password::Passwords,
};

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-for-integration-tests";

/// Argon2 with minimal cost so logins in tests are fast.
pub fn fast_passwords() -> Passwords {
    Passwords::with_params(argon2::Params::new(8, 1, 1, None).unwrap())
}

pub fn test_config(db: Database) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: TEST_SECRET.to_vec(),
        lifetimes: TokenLifetimes::default(),
        secure_cookies: false,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        static_dir: None,
        passwords: fast_passwords(),
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    /// Same secret and lifetimes as the app, for minting tokens directly
    pub jwt: JwtConfig,
}

/// App with the default admin/admin account seeded.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

pub async fn create_test_app_with(customize: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    ensure_default_user(&db, Arc::new(fast_passwords()))
        .await
        .expect("Failed to seed default user");

    let mut config = test_config(db.clone());
    customize(&mut config);

    let jwt = JwtConfig::with_lifetimes(&config.jwt_secret, config.lifetimes);
    TestApp {
        app: create_app(&config),
        db,
        jwt,
    }
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "password": password });
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn access_cookie(token: &str) -> String {
    format!("access_token={}", token)
}

pub fn refresh_cookie(token: &str) -> String {
    format!("refresh_token={}", token)
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of the named cookie in a list of Set-Cookie headers.
pub fn set_cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let (pair, _) = c.split_once(';').unwrap_or((c.as_str(), ""));
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Set-Cookie header for the named cookie.
pub fn find_set_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    cookies
        .iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
