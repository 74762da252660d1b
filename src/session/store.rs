//! Session store for one client context.
//!
//! DESIGN
//! ======
//! All state changes go through `reducer::reduce`; the store only decides
//! which actions to dispatch and keeps persisted storage in step. Reading
//! persisted state is an explicit `rehydrate` step. `is_authenticated` is a
//! plain query and never touches storage.
//!
//! Persistence layout: `TOKEN_KEY` holds the raw token and `USER_KEY` the
//! user JSON. Login writes both only with `remember_me` and removes both
//! otherwise; register always writes both. Logout, a failed write and any
//! failed rehydration remove both.

use crate::guard::AuthSnapshot;
use crate::services::auth::AuthService;
use crate::token::{self, TOKEN_TTL_MS};
use crate::types::{AuthError, AuthErrorKind, AuthGrant, LoginCredentials, RegisterData, Session, User};

use super::reducer::{AuthAction, AuthState, Status, reduce};
use super::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};

pub struct SessionStore<S> {
    state: AuthState,
    storage: S,
    auth: AuthService,
}

impl<S: SessionStorage> SessionStore<S> {
    /// New, uninitialized store. Storage is not read until [`Self::rehydrate`].
    #[must_use]
    pub fn new(storage: S, auth: AuthService) -> Self {
        Self { state: AuthState::default(), storage, auth }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[cfg(test)]
    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.state.status()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&AuthError> {
        self.state.error.as_ref()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// Whether an unexpired authenticated session is held in memory.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(token::now_millis())
    }

    #[must_use]
    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        self.session().is_some_and(|s| s.is_authenticated && s.expires_at > now_ms)
    }

    /// Flags consumed by the page guard.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot {
            authenticated: self.is_authenticated(),
            loading: self.state.loading,
            initialized: self.state.initialized,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Mark the store ready. Synchronous; does not read storage.
    pub fn initialize(&mut self) {
        self.dispatch(AuthAction::Initialized);
    }

    /// Restore a persisted session if no live one is held.
    ///
    /// Returns whether the store is authenticated afterwards. A persisted
    /// pair that is expired, malformed, mismatched or half-present is
    /// removed. An in-memory session that has expired is dropped and
    /// reported as `SESSION_EXPIRED`.
    pub fn rehydrate(&mut self) -> bool {
        self.rehydrate_at(token::now_millis())
    }

    pub fn rehydrate_at(&mut self, now_ms: i64) -> bool {
        if let Some(session) = self.session() {
            if session.is_authenticated && session.expires_at > now_ms {
                return true;
            }
            tracing::info!(user_id = %session.user.id, "in-memory session expired");
            self.clear_persisted();
            self.dispatch(AuthAction::Logout);
            self.dispatch(AuthAction::SetError(Some(AuthError::session_expired())));
            return false;
        }

        let token = self.storage.get(TOKEN_KEY);
        let user = self.storage.get(USER_KEY);
        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            (None, None) => return false,
            _ => {
                tracing::debug!("discarding half-persisted session");
                self.clear_persisted();
                return false;
            }
        };

        match restore(&token, &user, now_ms) {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "session rehydrated");
                self.dispatch(AuthAction::SetSession(Some(session)));
                true
            }
            None => {
                tracing::debug!("discarding invalid persisted session");
                self.clear_persisted();
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Sign in. Persists the session only when `remember_me` is set;
    /// otherwise any previously persisted pair is removed.
    ///
    /// # Errors
    ///
    /// The operation's [`AuthError`], which is also left in the error slot.
    pub async fn login(&mut self, creds: &LoginCredentials) -> Result<Session, AuthError> {
        self.begin();
        let result = self.auth.login(creds).await;
        self.settle(result, creds.remember_me)
    }

    /// Create an account and sign in. Always persists the session.
    ///
    /// # Errors
    ///
    /// The operation's [`AuthError`], which is also left in the error slot.
    pub async fn register(&mut self, data: &RegisterData) -> Result<Session, AuthError> {
        self.begin();
        let result = self.auth.register(data).await;
        self.settle(result, true)
    }

    /// Request a password reset. The current session is left untouched.
    ///
    /// # Errors
    ///
    /// `USER_NOT_FOUND`, also left in the error slot.
    pub async fn request_password_reset(&mut self, email: &str) -> Result<(), AuthError> {
        self.begin();
        match self.auth.request_password_reset(email).await {
            Ok(_) => {
                self.dispatch(AuthAction::SetLoading(false));
                Ok(())
            }
            Err(e) => {
                self.dispatch(AuthAction::SetError(Some(e.clone())));
                Err(e)
            }
        }
    }

    /// Drop the session and both persisted entries, unconditionally.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user() {
            tracing::info!(user_id = %user.id, "logout");
        }
        self.clear_persisted();
        self.dispatch(AuthAction::Logout);
    }

    pub fn clear_error(&mut self) {
        self.dispatch(AuthAction::ClearError);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn dispatch(&mut self, action: AuthAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn begin(&mut self) {
        self.dispatch(AuthAction::SetLoading(true));
        self.dispatch(AuthAction::ClearError);
    }

    fn settle(&mut self, result: Result<AuthGrant, AuthError>, persist: bool) -> Result<Session, AuthError> {
        let grant = match result {
            Ok(grant) => grant,
            Err(e) => {
                self.dispatch(AuthAction::SetError(Some(e.clone())));
                return Err(e);
            }
        };

        if persist {
            if let Err(e) = self.persist(&grant) {
                tracing::warn!(error = %e, "failed to persist session");
                self.clear_persisted();
                let err = AuthError::new(AuthErrorKind::NetworkError, "Connection error, please try again");
                self.dispatch(AuthAction::SetError(Some(err.clone())));
                return Err(err);
            }
        } else {
            // A pair left by an earlier remembered sign-in belongs to someone else now.
            self.clear_persisted();
        }

        let session = session_from_grant(grant);
        self.dispatch(AuthAction::SetSession(Some(session.clone())));
        Ok(session)
    }

    fn persist(&mut self, grant: &AuthGrant) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&grant.user)?;
        self.storage.set(TOKEN_KEY, &grant.token)?;
        self.storage.set(USER_KEY, &user_json)
    }

    fn clear_persisted(&mut self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear persisted session entry");
            }
        }
    }
}

/// Build a session whose expiry is the token's own `exp` claim.
fn session_from_grant(grant: AuthGrant) -> Session {
    let expires_at = token::validate(&grant.token)
        .map_or_else(|_| token::now_millis().saturating_add(TOKEN_TTL_MS), |claims| claims.exp);
    Session { user: grant.user, token: grant.token, expires_at, is_authenticated: true }
}

/// Rebuild a session from the persisted pair, or `None` if it must be discarded.
fn restore(token: &str, user_json: &str, now_ms: i64) -> Option<Session> {
    let claims = token::validate_at(token, now_ms).ok()?;
    let user: User = serde_json::from_str(user_json).ok()?;
    if user.id != claims.user_id {
        return None;
    }
    Some(Session { user, token: token.to_owned(), expires_at: claims.exp, is_authenticated: true })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
