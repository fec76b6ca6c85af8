//! Session service: authenticated state over the in-memory user directory.
//!
//! Holds the process-scoped user directory plus the current session state
//! (authenticated flag, active username). All mutation happens on the TUI
//! thread; state is destroyed when the process exits.

use crate::domain::{AuthError, UserDirectory};

/// Per-process session over the user directory.
#[derive(Debug, Default)]
pub struct SessionService {
    directory: UserDirectory,
    authenticated: bool,
    username: Option<String>,
}

impl SessionService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user. Does not log the user in.
    ///
    /// # Errors
    /// Returns a user-visible error on mismatched passwords, an empty or
    /// taken username, or an empty password.
    pub fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        self.directory.register(username, email, password, confirm)
    }

    /// Verify credentials and, on success, mark the session authenticated.
    ///
    /// # Errors
    /// Returns `AuthError::InvalidCredentials` on any failed check.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        self.directory.verify(username, password)?;
        self.authenticated = true;
        self.username = Some(username.trim().to_string());
        tracing::info!(username = username.trim(), "User logged in");
        Ok(())
    }

    /// Clear the authenticated flag and active username.
    pub fn logout(&mut self) {
        if let Some(username) = self.username.take() {
            tracing::info!(%username, "User logged out");
        }
        self.authenticated = false;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Active username while authenticated.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Number of registered users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.directory.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_login() {
        let mut session = SessionService::new();
        session
            .register("nora", "nora@example.com", "pw-1234", "pw-1234")
            .expect("registration should succeed");
        assert!(!session.is_authenticated());

        session.login("nora", "pw-1234").expect("login should succeed");
        assert!(session.is_authenticated());
        assert_eq!(session.username(), Some("nora"));
    }

    #[test]
    fn test_wrong_password_leaves_session_unauthenticated() {
        let mut session = SessionService::new();
        session
            .register("nora", "nora@example.com", "pw-1234", "pw-1234")
            .expect("registration should succeed");

        assert_eq!(
            session.login("nora", "nope"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(!session.is_authenticated());
        assert!(session.username().is_none());
    }

    #[test]
    fn test_logout_clears_state() {
        let mut session = SessionService::new();
        session
            .register("nora", "nora@example.com", "pw-1234", "pw-1234")
            .expect("registration should succeed");
        session.login("nora", "pw-1234").expect("login should succeed");

        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.username().is_none());

        // Re-login after logout still works.
        session.login("nora", "pw-1234").expect("re-login should succeed");
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_failed_registration_does_not_add_user() {
        let mut session = SessionService::new();
        let result = session.register("nora", "nora@example.com", "a", "b");
        assert_eq!(result, Err(AuthError::PasswordMismatch));
        assert_eq!(session.user_count(), 0);
    }
}
