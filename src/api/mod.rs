mod session;

use axum::Router;

use crate::auth::CookiePolicy;
use crate::session::Sessions;

pub use session::SessionApiState;

/// Create the API router.
pub fn create_api_router(sessions: Sessions, cookies: CookiePolicy) -> Router {
    let session_state = SessionApiState { sessions, cookies };

    Router::new().merge(session::router(session_state))
}
