//! Cookie-based JWT authentication for API routes.
//!
//! Access tokens authorize requests; refresh tokens only mint new access
//! tokens through the refresh endpoint. Both travel as HttpOnly cookies.

mod cookie;
mod errors;
mod extractors;
mod state;
mod types;

pub use cookie::{ACCESS_COOKIE_NAME, CookiePolicy, REFRESH_COOKIE_NAME, get_cookie};
pub use extractors::Auth;
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
