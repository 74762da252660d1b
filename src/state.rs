//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the auth service (which owns the shared mock directory) and the
//! cookie settings. Clone is required by Axum; the service is Arc-backed.

use crate::config::AppConfig;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    /// Mark the token cookie `Secure`.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(auth: AuthService, cookie_secure: bool) -> Self {
        Self { auth, cookie_secure }
    }

    /// State over the seeded demo directory, configured from `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(AuthService::seeded(config.latency), config.cookie_secure)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
