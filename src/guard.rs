//! Route protection decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two call sites gate the dashboard: the page guard, which looks at a
//! session store snapshot, and the navigation guard, which runs per request
//! and only sees the token cookie. Both resolve token validity through
//! `token::validate`, so expiry is judged the same way in both places.

use crate::token;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const REDIRECT_PARAM: &str = "redirect";

/// Path prefixes that require a valid token.
const PROTECTED_PREFIXES: &[&str] = &[DASHBOARD_PATH];
/// Exact paths only meant for signed-out visitors.
const AUTH_PATHS: &[&str] = &[LOGIN_PATH, "/register", "/forgot-password"];
/// Prefixes the navigation guard never inspects.
const SKIPPED_PREFIXES: &[&str] = &["/api/", "/assets/"];
const SKIPPED_PATHS: &[&str] = &["/api", "/favicon.ico", "/healthz"];
const IMAGE_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// Flags the page guard needs from a session store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub authenticated: bool,
    pub loading: bool,
    pub initialized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    /// Show a waiting indicator.
    Wait,
    /// Navigate elsewhere.
    Redirect(String),
    /// Show the page.
    Render,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Continue,
    Redirect(String),
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p))
}

#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    AUTH_PATHS.contains(&path)
}

/// Whether the navigation guard runs for `path`. API routes, static assets,
/// the favicon, health checks and image files are skipped.
#[must_use]
pub fn should_intercept(path: &str) -> bool {
    if SKIPPED_PATHS.contains(&path) || SKIPPED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }
    let is_image = path
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)));
    !is_image
}

/// `/login?redirect=<path>` with `path` percent-encoded.
#[must_use]
pub fn login_redirect(return_to: &str) -> String {
    format!("{LOGIN_PATH}?{REDIRECT_PARAM}={}", urlencoding::encode(return_to))
}

/// Accept only local absolute paths as post-login targets.
#[must_use]
pub fn sanitize_redirect(target: Option<&str>) -> String {
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") && !t.contains('\\') => t.to_owned(),
        _ => DASHBOARD_PATH.to_owned(),
    }
}

/// Page-level guard for protected content.
#[must_use]
pub fn page_decision(path: &str, auth: AuthSnapshot) -> PageDecision {
    if auth.loading && !auth.initialized {
        return PageDecision::Wait;
    }
    if auth.authenticated { PageDecision::Render } else { PageDecision::Redirect(login_redirect(path)) }
}

/// Page-level guard for guest-only pages (sign-in, sign-up, recovery).
#[must_use]
pub fn guest_page_decision(auth: AuthSnapshot) -> PageDecision {
    if auth.loading && !auth.initialized {
        return PageDecision::Wait;
    }
    if auth.authenticated { PageDecision::Redirect(DASHBOARD_PATH.to_owned()) } else { PageDecision::Render }
}

/// Navigation-time guard driven only by the token cookie value.
#[must_use]
pub fn navigation_decision(path: &str, token: Option<&str>) -> NavigationDecision {
    navigation_decision_at(path, token, token::now_millis())
}

#[must_use]
pub fn navigation_decision_at(path: &str, token: Option<&str>, now_ms: i64) -> NavigationDecision {
    let valid = token.is_some_and(|t| token::validate_at(t, now_ms).is_ok());

    if is_protected(path) && !valid {
        return NavigationDecision::Redirect(login_redirect(path));
    }
    if is_auth_page(path) && valid {
        return NavigationDecision::Redirect(DASHBOARD_PATH.to_owned());
    }
    NavigationDecision::Continue
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
