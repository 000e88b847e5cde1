//! Session API endpoints.
//!
//! - POST `/login` - Check credentials, set access and refresh cookies
//! - GET `/me` - Identity of the access token holder
//! - POST `/logout` - Clear both cookies
//! - POST `/refresh` - Exchange the refresh cookie for a new access cookie

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{
    ACCESS_COOKIE_NAME, Auth, CookiePolicy, REFRESH_COOKIE_NAME, get_cookie,
};
use crate::impl_has_auth_backend;
use crate::session::{AuthError, SessionState, Sessions};

#[derive(Clone)]
pub struct SessionApiState {
    pub sessions: Sessions,
    pub cookies: CookiePolicy,
}

impl_has_auth_backend!(SessionApiState);

pub fn router(state: SessionApiState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    ok: bool,
    username: String,
    display_name: Option<String>,
}

#[derive(Serialize)]
struct IdentityResponse {
    username: String,
    display_name: Option<String>,
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

/// Log in with username and password.
/// Sets both token cookies on success; sets nothing on failure.
async fn login(
    State(state): State<SessionApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let grant = state
        .sessions
        .login(&payload.username, &payload.password)
        .await?;

    let access_cookie = state.cookies.issue(ACCESS_COOKIE_NAME, &grant.access);
    let refresh_cookie = state.cookies.issue(REFRESH_COOKIE_NAME, &grant.refresh);

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(LoginResponse {
            ok: true,
            username: grant.user.username,
            display_name: grant.user.display_name,
        }),
    ))
}

/// Identity of the current access token holder.
async fn me(Auth(auth): Auth) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        username: auth.user.username,
        display_name: auth.user.display_name,
    })
}

/// Logout - clear both cookies. Always succeeds.
/// Tokens are not revoked server-side and remain valid until they expire.
async fn logout(State(state): State<SessionApiState>, headers: HeaderMap) -> impl IntoResponse {
    let session = SessionState::of(
        state.sessions.jwt(),
        get_cookie(&headers, ACCESS_COOKIE_NAME),
        get_cookie(&headers, REFRESH_COOKIE_NAME),
    );
    debug!(?session, "Logging out");

    let clear_access = state.cookies.clear(ACCESS_COOKIE_NAME);
    let clear_refresh = state.cookies.clear(REFRESH_COOKIE_NAME);

    (
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(OkResponse { ok: true }),
    )
}

/// Issue a new access token from the refresh cookie.
/// The refresh cookie itself is left untouched.
async fn refresh(
    State(state): State<SessionApiState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let refresh_token =
        get_cookie(&headers, REFRESH_COOKIE_NAME).ok_or(AuthError::MissingCredential)?;

    let access = state.sessions.refresh(refresh_token).await?;
    let access_cookie = state.cookies.issue(ACCESS_COOKIE_NAME, &access);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, access_cookie)],
        Json(OkResponse { ok: true }),
    ))
}
