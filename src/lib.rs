pub mod api;
pub mod assets;
pub mod auth;
pub mod bootstrap;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod launch;
pub mod password;
pub mod session;

use api::create_api_router;
use auth::CookiePolicy;
use axum::{Router, http::HeaderValue};
use db::Database;
use jwt::{JwtConfig, TokenLifetimes};
use password::Passwords;
use session::Sessions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access and refresh token lifetimes
    pub lifetimes: TokenLifetimes,
    /// Whether to set Secure flag on cookies (production deployments)
    pub secure_cookies: bool,
    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,
    /// Front-end build directory, mounted at `/` if it exists
    pub static_dir: Option<PathBuf>,
    /// Password hasher used for login verification
    pub passwords: Passwords,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::with_lifetimes(
        &config.jwt_secret,
        config.lifetimes,
    ));
    let sessions = Sessions::new(config.db.clone(), jwt, Arc::new(config.passwords.clone()));
    let cookies = CookiePolicy::new(config.secure_cookies);

    let mut router = Router::new().nest("/api", create_api_router(sessions, cookies));

    if let Some(files) = config.static_dir.as_deref().and_then(assets::static_files) {
        router = router.fallback_service(files);
    }

    router
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins, with credentials so cookies are sent.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            // A wildcard cannot be combined with credentials
            Ok(_) if o == "*" => {
                warn!("Ignoring wildcard CORS origin, list origins explicitly");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
