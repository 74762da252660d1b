//! Mock auth operations: login, register, password-reset request, lookup by id.
//!
//! DESIGN
//! ======
//! Each operation sleeps for its configured latency to stand in for a
//! network round trip, then runs against the shared in-memory directory.
//! The sleep happens before the directory lock is taken so slow calls never
//! hold it. Failures come back as `AuthError` values tagged with the form
//! field that caused them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::Latency;
use crate::directory::Directory;
use crate::token;
use crate::types::{AuthError, AuthErrorKind, AuthGrant, LoginCredentials, RegisterData, User};
use crate::validation::MIN_PASSWORD_LEN;

/// Handle to the mock user directory. Cheap to clone.
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<RwLock<Directory>>,
    latency: Latency,
}

impl AuthService {
    #[must_use]
    pub fn new(directory: Directory, latency: Latency) -> Self {
        tracing::debug!(users = directory.len(), ?latency, "auth service ready");
        Self { directory: Arc::new(RwLock::new(directory)), latency }
    }

    /// Service over the seeded demo directory.
    #[must_use]
    pub fn seeded(latency: Latency) -> Self {
        Self::new(Directory::seeded(), latency)
    }

    /// Authenticate by exact email match and plaintext password comparison.
    ///
    /// # Errors
    ///
    /// `USER_NOT_FOUND` on `email` for an unknown address, `INVALID_CREDENTIALS`
    /// on `password` when the password does not match.
    pub async fn login(&self, creds: &LoginCredentials) -> Result<AuthGrant, AuthError> {
        simulate_latency(self.latency.login).await;

        let dir = self.directory.read().await;
        let Some(user) = dir.find_by_email(&creds.email) else {
            tracing::debug!(email = %creds.email, "login for unknown email");
            return Err(AuthError::user_not_found());
        };

        if dir.password_for(&creds.email) != Some(creds.password.as_str()) {
            tracing::debug!(user_id = %user.id, "login password mismatch");
            return Err(AuthError::invalid_credentials());
        }

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(AuthGrant { token: token::issue(&user.id), user: user.clone() })
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// `EMAIL_ALREADY_EXISTS` on `email`, then `WEAK_PASSWORD` on `password`
    /// for a short password, then `WEAK_PASSWORD` on `confirmPassword` when
    /// the confirmation differs.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthGrant, AuthError> {
        simulate_latency(self.latency.register).await;

        let mut dir = self.directory.write().await;
        if dir.find_by_email(&data.email).is_some() {
            return Err(AuthError::email_already_exists());
        }
        if data.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(AuthErrorKind::WeakPassword, "Password must be at least 8 characters")
                .on_field("password"));
        }
        if data.password != data.confirm_password {
            return Err(AuthError::new(AuthErrorKind::WeakPassword, "Passwords do not match").on_field("confirmPassword"));
        }

        let phone = data.phone.clone().filter(|p| !p.trim().is_empty());
        let user = dir.new_user(&data.name, &data.email, phone, data.newsletter.unwrap_or(false));
        dir.insert(user.clone(), &data.password);

        tracing::info!(user_id = %user.id, "user registered");
        Ok(AuthGrant { token: token::issue(&user.id), user })
    }

    /// Pretend to send a password-reset message.
    ///
    /// Nothing is dispatched; the request is only logged.
    ///
    /// # Errors
    ///
    /// `USER_NOT_FOUND` on `email` for an unknown address.
    pub async fn request_password_reset(&self, email: &str) -> Result<AuthGrant, AuthError> {
        simulate_latency(self.latency.reset).await;

        let Some(user) = self.lookup_email(email).await else {
            return Err(AuthError::user_not_found());
        };

        tracing::info!(user_id = %user.id, email = %email, "password reset requested (not sent)");
        Ok(AuthGrant { token: token::issue(&user.id), user })
    }

    /// Look a user up by id.
    pub async fn user_by_id(&self, id: &str) -> Option<User> {
        simulate_latency(self.latency.lookup).await;
        self.directory.read().await.find_by_id(id).cloned()
    }

    async fn lookup_email(&self, email: &str) -> Option<User> {
        self.directory.read().await.find_by_email(email).cloned()
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
