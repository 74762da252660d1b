use super::*;

const NOW: i64 = 1_760_000_000_000;

fn snapshot(authenticated: bool, loading: bool, initialized: bool) -> AuthSnapshot {
    AuthSnapshot { authenticated, loading, initialized }
}

// =============================================================================
// path classification
// =============================================================================

#[test]
fn dashboard_and_children_are_protected() {
    assert!(is_protected("/dashboard"));
    assert!(is_protected("/dashboard/settings"));
    assert!(!is_protected("/"));
    assert!(!is_protected("/login"));
}

#[test]
fn auth_pages_match_exactly() {
    assert!(is_auth_page("/login"));
    assert!(is_auth_page("/register"));
    assert!(is_auth_page("/forgot-password"));
    assert!(!is_auth_page("/login/extra"));
}

#[test]
fn matcher_skips_api_assets_and_images() {
    for path in ["/api", "/api/auth/login", "/assets/app.css", "/favicon.ico", "/healthz", "/hero.PNG", "/img/a.webp"] {
        assert!(!should_intercept(path), "should skip {path}");
    }
}

#[test]
fn matcher_intercepts_pages() {
    for path in ["/", "/login", "/dashboard", "/dashboard/x", "/apiary", "/docs.html"] {
        assert!(should_intercept(path), "should intercept {path}");
    }
}

// =============================================================================
// redirects
// =============================================================================

#[test]
fn login_redirect_encodes_return_path() {
    assert_eq!(login_redirect("/dashboard"), "/login?redirect=%2Fdashboard");
    assert_eq!(login_redirect("/dashboard/a b"), "/login?redirect=%2Fdashboard%2Fa%20b");
}

#[test]
fn sanitize_redirect_accepts_local_paths() {
    assert_eq!(sanitize_redirect(Some("/dashboard/fincas")), "/dashboard/fincas");
}

#[test]
fn sanitize_redirect_rejects_foreign_targets() {
    for bad in [None, Some(""), Some("https://evil.example"), Some("//evil.example"), Some("/\\evil.example")] {
        assert_eq!(sanitize_redirect(bad), DASHBOARD_PATH, "target {bad:?}");
    }
}

// =============================================================================
// page guard
// =============================================================================

#[test]
fn page_waits_while_loading_before_init() {
    assert_eq!(page_decision("/dashboard", snapshot(false, true, false)), PageDecision::Wait);
}

#[test]
fn page_does_not_wait_once_initialized() {
    assert_eq!(
        page_decision("/dashboard", snapshot(false, true, true)),
        PageDecision::Redirect("/login?redirect=%2Fdashboard".into())
    );
}

#[test]
fn page_redirects_unauthenticated_with_return_path() {
    assert_eq!(
        page_decision("/dashboard/bookings", snapshot(false, false, true)),
        PageDecision::Redirect("/login?redirect=%2Fdashboard%2Fbookings".into())
    );
}

#[test]
fn page_renders_for_authenticated() {
    assert_eq!(page_decision("/dashboard", snapshot(true, false, true)), PageDecision::Render);
}

#[test]
fn guest_page_sends_authenticated_to_dashboard() {
    assert_eq!(guest_page_decision(snapshot(true, false, true)), PageDecision::Redirect("/dashboard".into()));
    assert_eq!(guest_page_decision(snapshot(false, false, true)), PageDecision::Render);
    assert_eq!(guest_page_decision(snapshot(false, true, false)), PageDecision::Wait);
}

// =============================================================================
// navigation guard
// =============================================================================

#[test]
fn protected_without_token_redirects_to_login() {
    assert_eq!(
        navigation_decision_at("/dashboard", None, NOW),
        NavigationDecision::Redirect("/login?redirect=%2Fdashboard".into())
    );
}

#[test]
fn protected_with_valid_token_continues() {
    let token = token::issue_at("1", NOW);
    assert_eq!(navigation_decision_at("/dashboard", Some(&token), NOW + 1), NavigationDecision::Continue);
}

#[test]
fn protected_with_expired_token_redirects() {
    let token = token::issue_at("1", NOW);
    let later = NOW + token::TOKEN_TTL_MS;
    assert!(matches!(navigation_decision_at("/dashboard", Some(&token), later), NavigationDecision::Redirect(_)));
}

#[test]
fn protected_with_garbage_token_redirects() {
    assert!(matches!(navigation_decision_at("/dashboard", Some("junk"), NOW), NavigationDecision::Redirect(_)));
}

#[test]
fn auth_page_with_valid_token_goes_to_dashboard() {
    let token = token::issue_at("1", NOW);
    assert_eq!(
        navigation_decision_at("/register", Some(&token), NOW + 1),
        NavigationDecision::Redirect("/dashboard".into())
    );
}

#[test]
fn auth_page_with_expired_token_continues() {
    let token = token::issue_at("1", NOW);
    assert_eq!(
        navigation_decision_at("/login", Some(&token), NOW + token::TOKEN_TTL_MS),
        NavigationDecision::Continue
    );
}

#[test]
fn public_pages_always_continue() {
    assert_eq!(navigation_decision_at("/", None, NOW), NavigationDecision::Continue);
    let token = token::issue_at("1", NOW);
    assert_eq!(navigation_decision_at("/", Some(&token), NOW + 1), NavigationDecision::Continue);
}
