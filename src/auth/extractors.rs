//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::session::AuthError;

/// Extractor for endpoints that require a valid access token.
/// Never falls back to the refresh token: an expired access token is
/// rejected and the client is expected to call the refresh endpoint.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token =
            get_cookie(&parts.headers, ACCESS_COOKIE_NAME).ok_or(AuthError::MissingCredential)?;

        let user = state.sessions().identify(token).await?;
        Ok(Auth(AuthenticatedUser { user }))
    }
}
