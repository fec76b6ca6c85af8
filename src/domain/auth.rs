//! In-memory user directory with Argon2id credential hashing.
//!
//! This is a process-scoped directory: records live only as long as the
//! process and are never written to disk. It gates access to the prediction
//! flow but is explicitly not a security boundary (no lockout, expiry, or
//! password policy).

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Errors surfaced to the user during registration and login.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// A registered user. The password is stored only as an Argon2id PHC string.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub email: String,
    password_hash: String,
}

/// Process-lifetime mapping from username to credential record.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user.
    ///
    /// A failed registration never mutates the directory.
    ///
    /// # Errors
    /// Returns a user-visible error when the passwords mismatch, the username
    /// is empty or already taken, or the password is empty.
    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if password != confirm {
            return Err(AuthError::PasswordMismatch);
        }
        if self.users.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(password)?;
        self.users.insert(
            username.to_string(),
            UserRecord {
                email: email.trim().to_string(),
                password_hash,
            },
        );

        tracing::info!(username, "User registered");
        Ok(())
    }

    /// Verify credentials.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password; the two cases are deliberately indistinguishable.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let record = self
            .users
            .get(username.trim())
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed =
            PasswordHash::new(&record.password_hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Look up a registered user.
    #[must_use]
    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username.trim())
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username.trim())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_verify() {
        let mut dir = UserDirectory::new();
        dir.register("carlos", "carlos@example.com", "Str0ng-pass", "Str0ng-pass")
            .expect("registration should succeed");

        assert!(dir.verify("carlos", "Str0ng-pass").is_ok());
        assert_eq!(
            dir.verify("carlos", "wrong-pass"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unknown_user_fails_verification() {
        let dir = UserDirectory::new();
        assert_eq!(
            dir.verify("ghost", "anything"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_password_mismatch_does_not_mutate() {
        let mut dir = UserDirectory::new();
        let result = dir.register("ana", "ana@example.com", "one", "two");

        assert_eq!(result, Err(AuthError::PasswordMismatch));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_duplicate_username_does_not_overwrite() {
        let mut dir = UserDirectory::new();
        dir.register("ana", "first@example.com", "pw", "pw")
            .expect("first registration should succeed");

        let result = dir.register("ana", "second@example.com", "other", "other");
        assert_eq!(result, Err(AuthError::UsernameTaken));

        assert_eq!(dir.len(), 1);
        assert_eq!(
            dir.get("ana").map(|r| r.email.as_str()),
            Some("first@example.com")
        );
        assert!(dir.verify("ana", "pw").is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        let mut dir = UserDirectory::new();
        assert_eq!(
            dir.register("   ", "x@example.com", "pw", "pw"),
            Err(AuthError::EmptyUsername)
        );
        assert!(dir.is_empty());
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = hash_password("same").expect("hash");
        let h2 = hash_password("same").expect("hash");
        assert_ne!(h1, h2);
    }
}
