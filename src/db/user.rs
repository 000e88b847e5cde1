use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Outcome of [`UserStore::upsert_password`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSet {
    Created,
    Updated,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. Fails if the username is taken. Returns the user ID.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        display_name: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, display_name) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, username, password_hash, display_name FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    /// Replace a user's password hash. Returns false if the user doesn't exist.
    pub async fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set a user's password hash, creating the user if missing.
    /// `display_name` is only used when the user is created.
    pub async fn upsert_password(
        &self,
        username: &str,
        password_hash: &str,
        display_name: Option<&str>,
    ) -> Result<PasswordSet, sqlx::Error> {
        if self.update_password(username, password_hash).await? {
            return Ok(PasswordSet::Updated);
        }

        // A concurrent insert between the two statements turns into an update.
        sqlx::query(
            "INSERT INTO users (username, password_hash, display_name) VALUES (?, ?, ?)
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .execute(&self.pool)
        .await?;
        Ok(PasswordSet::Created)
    }

    /// Number of stored users.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
