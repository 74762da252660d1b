//! Pure state transitions for the session store.

use crate::types::{AuthError, Session};

/// Snapshot of the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub loading: bool,
    pub error: Option<AuthError>,
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    SetLoading(bool),
    SetSession(Option<Session>),
    SetError(Option<AuthError>),
    ClearError,
    Logout,
    Initialized,
}

/// Coarse lifecycle phase derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Uninitialized,
    Idle,
    Loading,
    Authenticated,
    Error,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Authenticated => "authenticated",
            Self::Error => "error",
        }
    }
}

impl AuthState {
    #[must_use]
    pub fn status(&self) -> Status {
        if self.loading {
            Status::Loading
        } else if self.session.as_ref().is_some_and(|s| s.is_authenticated) {
            Status::Authenticated
        } else if self.error.is_some() {
            Status::Error
        } else if !self.initialized {
            Status::Uninitialized
        } else {
            Status::Idle
        }
    }
}

#[must_use]
pub fn reduce(state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::SetLoading(loading) => AuthState { loading, ..state },
        AuthAction::SetSession(session) => AuthState { session, loading: false, error: None, initialized: true },
        AuthAction::SetError(error) => AuthState { error, loading: false, ..state },
        AuthAction::ClearError => AuthState { error: None, ..state },
        AuthAction::Logout => AuthState { session: None, loading: false, error: None, initialized: true },
        AuthAction::Initialized => AuthState { loading: false, initialized: true, ..state },
    }
}

#[cfg(test)]
#[path = "reducer_test.rs"]
mod tests;
