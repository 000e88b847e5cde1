//! HTTP rendering of session errors.
//!
//! Errors never touch cookies: a failed identity query must leave the refresh
//! cookie in place so the client can still refresh.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::session::AuthError;

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthenticationFailure
            | AuthError::MissingCredential
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject => StatusCode::UNAUTHORIZED,
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::AuthenticationFailure => "Invalid credentials",
            AuthError::MissingCredential => "Not authenticated",
            AuthError::InvalidToken => "Invalid token",
            AuthError::ExpiredToken => "Token expired",
            AuthError::UnknownSubject => "User not found",
            AuthError::Store(_) => "Database error",
            AuthError::Internal(_) => "Internal error",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Store(e) => tracing::error!("Store error during authentication: {}", e),
            AuthError::Internal(e) => tracing::error!("Authentication failed internally: {}", e),
            _ => {}
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
