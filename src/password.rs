//! Password hashing using argon2.
//!
//! Hashes are stored as PHC strings, so verification always runs with the
//! parameters the hash was created with.
//!
//! Argon2 is intentionally CPU-intensive. The async variants move the work to
//! the blocking thread pool so request handlers don't stall the runtime.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// Errors from hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(password_hash::Error),
    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Argon2id hasher.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    /// Stand-in hash with the same cost parameters, verified when the
    /// username is unknown so both failure paths take the same time.
    dummy_hash: String,
}

impl Default for Passwords {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl Passwords {
    pub fn with_params(params: Params) -> Self {
        let dummy_hash = format!(
            "$argon2id$v=19$m={},t={},p={}$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            params.m_cost(),
            params.t_cost(),
            params.p_cost()
        );
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash,
        }
    }

    /// Hash a password with a fresh random salt (blocking).
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash (blocking).
    /// Returns `Ok(false)` on mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(PasswordError::MalformedHash)?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn the same work as a real verification. Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }

    pub async fn hash_async(self: Arc<Self>, password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || self.hash(&password)).await?
    }

    /// Verify on the blocking pool. With no stored hash the dummy hash is
    /// checked instead and the result is always `false`.
    pub async fn verify_async(
        self: Arc<Self>,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => self.verify(&password, &hash),
            None => Ok(self.verify_dummy(&password)),
        })
        .await?
    }
}

#[cfg(test)]
pub(crate) fn test_passwords() -> Passwords {
    Passwords::with_params(Params::new(8, 1, 1, None).unwrap())
}
