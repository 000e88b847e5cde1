//! First-run setup and account provisioning outside the HTTP API.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{Database, PasswordSet};
use crate::password::{PasswordError, Passwords};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_DISPLAY_NAME: &str = "Administrator";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("database error: {0}")]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Create the default account if the store holds no users.
/// Returns whether an account was created.
pub async fn ensure_default_user(
    db: &Database,
    passwords: Arc<Passwords>,
) -> Result<bool, BootstrapError> {
    if db.users().count().await? > 0 {
        return Ok(false);
    }

    let hash = passwords.hash_async(DEFAULT_PASSWORD.to_string()).await?;
    db.users()
        .create(DEFAULT_USERNAME, &hash, Some(DEFAULT_DISPLAY_NAME))
        .await?;

    info!(username = DEFAULT_USERNAME, "Default user created");
    warn!(
        "Default user '{}' has password '{}'. Change it with latchkey-set-password",
        DEFAULT_USERNAME, DEFAULT_PASSWORD
    );
    Ok(true)
}

/// Hash `password` and store it for `username`.
///
/// With `create_as` set, a missing user is created with that display name;
/// otherwise a missing user yields `Ok(None)` and nothing is written.
pub async fn set_password(
    db: &Database,
    passwords: Arc<Passwords>,
    username: &str,
    password: &str,
    create_as: Option<&str>,
) -> Result<Option<PasswordSet>, BootstrapError> {
    let hash = passwords.hash_async(password.to_string()).await?;
    let users = db.users();

    let outcome = match create_as {
        Some(display_name) => Some(
            users
                .upsert_password(username, &hash, Some(display_name))
                .await?,
        ),
        None => users
            .update_password(username, &hash)
            .await?
            .then_some(PasswordSet::Updated),
    };

    if let Some(outcome) = outcome {
        info!(username = %username, ?outcome, "Password set");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::test_passwords;

    #[tokio::test]
    async fn test_seeds_empty_store() {
        let db = Database::open(":memory:").await.unwrap();
        let passwords = Arc::new(test_passwords());

        assert!(ensure_default_user(&db, passwords.clone()).await.unwrap());

        let user = db
            .users()
            .get_by_username(DEFAULT_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some(DEFAULT_DISPLAY_NAME));
        assert!(
            passwords
                .verify(DEFAULT_PASSWORD, &user.password_hash)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let db = Database::open(":memory:").await.unwrap();
        let passwords = Arc::new(test_passwords());

        assert!(ensure_default_user(&db, passwords.clone()).await.unwrap());
        assert!(!ensure_default_user(&db, passwords).await.unwrap());
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_existing_users_are_left_alone() {
        let db = Database::open(":memory:").await.unwrap();
        db.users().create("alice", "hash", None).await.unwrap();

        assert!(
            !ensure_default_user(&db, Arc::new(test_passwords()))
                .await
                .unwrap()
        );
        assert!(
            db.users()
                .get_by_username(DEFAULT_USERNAME)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_set_password_updates_existing_user() {
        let db = Database::open(":memory:").await.unwrap();
        let passwords = Arc::new(test_passwords());
        ensure_default_user(&db, passwords.clone()).await.unwrap();

        let outcome = set_password(&db, passwords.clone(), "admin", "s3cret", None)
            .await
            .unwrap();
        assert_eq!(outcome, Some(PasswordSet::Updated));

        let user = db.users().get_by_username("admin").await.unwrap().unwrap();
        assert!(passwords.verify("s3cret", &user.password_hash).unwrap());
        assert!(!passwords.verify("admin", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_set_password_missing_user_without_create() {
        let db = Database::open(":memory:").await.unwrap();

        let outcome = set_password(&db, Arc::new(test_passwords()), "admin", "pw", None)
            .await
            .unwrap();
        assert_eq!(outcome, None);
        assert_eq!(db.users().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_password_creates_when_asked() {
        let db = Database::open(":memory:").await.unwrap();
        let passwords = Arc::new(test_passwords());

        let outcome = set_password(
            &db,
            passwords.clone(),
            "admin",
            "pw",
            Some(DEFAULT_DISPLAY_NAME),
        )
        .await
        .unwrap();
        assert_eq!(outcome, Some(PasswordSet::Created));

        let user = db.users().get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some(DEFAULT_DISPLAY_NAME));
        assert!(passwords.verify("pw", &user.password_hash).unwrap());
    }
}
