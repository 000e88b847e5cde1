//! Session protocol: login, identity lookup and access token refresh.
//!
//! A session is a pair of tokens held by the client. Nothing is stored on the
//! server, so logout only means the client drops both cookies; tokens stay
//! cryptographically valid until they expire.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::db::{Database, User};
use crate::jwt::{IssuedToken, JwtConfig, JwtError, TokenType};
use crate::password::{PasswordError, Passwords};

/// Reasons a session operation can fail.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    AuthenticationFailure,
    #[error("no credential presented")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    /// The token is valid but its user no longer exists.
    #[error("unknown subject")]
    UnknownSubject,
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Expired => AuthError::ExpiredToken,
            JwtError::Invalid(_) | JwtError::WrongTokenType => AuthError::InvalidToken,
            JwtError::Encoding(_) | JwtError::TimeError => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

/// Where a client stands, judged from the credentials it presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable credentials at all.
    Anonymous,
    /// Holds a valid access token.
    Authenticated,
    /// Access token missing or expired, refresh token still valid.
    Refreshable,
    /// Presented tokens have all expired; a new login is required.
    Expired,
}

impl SessionState {
    /// Classify a credential pair. Tokens with a bad signature or the wrong
    /// class count as absent.
    ///
    /// Diagnostic only: request handling never branches on it, the logout
    /// endpoint logs it at debug level.
    pub fn of(jwt: &JwtConfig, access: Option<&str>, refresh: Option<&str>) -> Self {
        let access = access.map(|t| jwt.verify_as(t, TokenType::Access));
        if matches!(access, Some(Ok(_))) {
            return SessionState::Authenticated;
        }

        let refresh = refresh.map(|t| jwt.verify_as(t, TokenType::Refresh));
        match refresh {
            Some(Ok(_)) => SessionState::Refreshable,
            Some(Err(JwtError::Expired)) => SessionState::Expired,
            _ if matches!(access, Some(Err(JwtError::Expired))) => SessionState::Expired,
            _ => SessionState::Anonymous,
        }
    }
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub user: User,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Runs the session protocol over the credential store and token config.
#[derive(Clone)]
pub struct Sessions {
    db: Database,
    jwt: Arc<JwtConfig>,
    passwords: Arc<Passwords>,
}

impl Sessions {
    pub fn new(db: Database, jwt: Arc<JwtConfig>, passwords: Arc<Passwords>) -> Self {
        Self { db, jwt, passwords }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Check credentials and issue an access and a refresh token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let user = self.db.users().get_by_username(username).await?;

        // Unknown users still pay for a full hash verification.
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let verified = self
            .passwords
            .clone()
            .verify_async(password.to_string(), stored_hash)
            .await
            .map_err(|e| {
                error!(username = %username, error = %e, "Password verification failed");
                AuthError::from(e)
            })?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                debug!(username = %username, "Login rejected");
                return Err(AuthError::AuthenticationFailure);
            }
        };

        let access = self.jwt.issue_access(&user.username)?;
        let refresh = self.jwt.issue_refresh(&user.username)?;

        info!(username = %user.username, "User logged in");

        Ok(LoginGrant {
            user,
            access,
            refresh,
        })
    }

    /// Resolve an access token to the user it was issued for.
    pub async fn identify(&self, access_token: &str) -> Result<User, AuthError> {
        let verified = self.jwt.verify_as(access_token, TokenType::Access)?;
        self.db
            .users()
            .get_by_username(&verified.subject)
            .await?
            .ok_or(AuthError::UnknownSubject)
    }

    /// Exchange a refresh token for a new access token. The refresh token is
    /// not rotated and stays usable until it expires.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let verified = self.jwt.verify_as(refresh_token, TokenType::Refresh)?;

        let user = self
            .db
            .users()
            .get_by_username(&verified.subject)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        let access = self.jwt.issue_access(&user.username)?;
        debug!(username = %user.username, "Access token refreshed");
        Ok(access)
    }
}
