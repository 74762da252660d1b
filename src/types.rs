//! Shared auth types: users, credentials, sessions and the error taxonomy.
//!
//! DESIGN
//! ======
//! Field names serialize in camelCase so the persisted user JSON and the
//! HTTP payloads keep the same shape the browser side stores.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::config::parse_bool;

// =============================================================================
// USER
// =============================================================================

/// Optional per-user preference flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub newsletter: bool,
    pub notifications: bool,
}

/// A registered user. Email is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub join_date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Login form payload. Only presence of the password is checked here;
/// strength rules apply to new passwords.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Persist the session beyond the current context.
    #[serde(default, deserialize_with = "checkbox")]
    pub remember_me: bool,
}

/// Registration form payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"), email(message = "Invalid email format"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "crate::validation::strong_password")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::phone_number"))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    #[validate(custom(function = "crate::validation::accepted"))]
    pub accept_terms: bool,
    #[serde(default, deserialize_with = "optional_checkbox")]
    pub newsletter: Option<bool>,
}

/// Password-recovery form payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Invalid email format"))]
    pub email: String,
}

/// Checkbox values arrive as JSON booleans or as form text (`on`, `true`).
#[derive(Deserialize)]
#[serde(untagged)]
enum Checkbox {
    Flag(bool),
    Text(String),
    Unset(()),
}

fn optional_checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Checkbox::deserialize(deserializer)? {
        Checkbox::Flag(flag) => Ok(Some(flag)),
        Checkbox::Text(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid checkbox value {raw:?}"))),
        Checkbox::Unset(()) => Ok(None),
    }
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    optional_checkbox(deserializer).map(Option::unwrap_or_default)
}

/// Successful auth operation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthGrant {
    pub user: User,
    pub token: String,
}

// =============================================================================
// SESSION
// =============================================================================

/// The live authenticated session held by a session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub token: String,
    /// Unix timestamp in milliseconds.
    pub expires_at: i64,
    pub is_authenticated: bool,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure category for auth operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorKind {
    InvalidCredentials,
    UserNotFound,
    EmailAlreadyExists,
    WeakPassword,
    NetworkError,
    SessionExpired,
}

impl AuthErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::NetworkError => "NETWORK_ERROR",
            Self::SessionExpired => "SESSION_EXPIRED",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed auth failure: a kind, a message for display, and the offending
/// form field when one applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    #[serde(rename = "code")]
    pub kind: AuthErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AuthError {
    #[must_use]
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), field: None }
    }

    #[must_use]
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub fn user_not_found() -> Self {
        Self::new(AuthErrorKind::UserNotFound, "No user was found with this email").on_field("email")
    }

    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorKind::InvalidCredentials, "Incorrect email or password").on_field("password")
    }

    #[must_use]
    pub fn email_already_exists() -> Self {
        Self::new(AuthErrorKind::EmailAlreadyExists, "An account with this email already exists").on_field("email")
    }

    #[must_use]
    pub fn session_expired() -> Self {
        Self::new(AuthErrorKind::SessionExpired, "Your session has expired, please sign in again")
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
