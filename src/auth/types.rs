//! Authentication user types.

use crate::db::User;

/// User resolved from a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}
