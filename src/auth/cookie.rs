//! Cookie parsing and `Set-Cookie` construction for session tokens.

use axum::http::header;

use crate::jwt::IssuedToken;

/// Cookie name for the access token (short-lived).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                let value = value.trim();
                // A cleared cookie some clients still echo back
                return (!value.is_empty()).then_some(value);
            }
        }
    }
    None
}

/// Attributes applied to every session cookie. Cookies are always HttpOnly
/// and SameSite=Lax; `secure` adds the Secure flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Cookie carrying a token, expiring together with it.
    pub fn issue(&self, name: &str, token: &IssuedToken) -> String {
        self.build(name, &token.token, token.duration)
    }

    /// Cookie instructing the client to drop `name`.
    pub fn clear(&self, name: &str) -> String {
        self.build(name, "", 0)
    }

    fn build(&self, name: &str, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
            name, value, max_age, secure
        )
    }
}
