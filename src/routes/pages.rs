//! HTML pages and the navigation guard middleware.
//!
//! Markup is minimal; pages exist for the routing around them.

use axum::extract::{Query, Request};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;

use super::auth::{AuthUser, TOKEN_COOKIE};
use crate::guard::{self, NavigationDecision};

// =============================================================================
// NAVIGATION GUARD
// =============================================================================

/// Runs on every request. Redirects signed-out visitors away from protected
/// paths and signed-in visitors away from the auth pages, judging only the
/// token cookie.
pub async fn navigation_guard(jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !guard::should_intercept(&path) {
        return next.run(request).await;
    }

    let token = jar.get(TOKEN_COOKIE).map(Cookie::value);
    match guard::navigation_decision(&path, token) {
        NavigationDecision::Continue => next.run(request).await,
        NavigationDecision::Redirect(to) => {
            tracing::debug!(%path, %to, "navigation guard redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}

// =============================================================================
// PAGES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    redirect: Option<String>,
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"gl\"><head><meta charset=\"utf-8\"><title>{title} · Finca Airbnb</title></head>\
         <body><main>{body}</main></body></html>\n",
        title = encode_text(title),
    ))
}

/// `GET /`: entry page.
pub async fn home() -> Html<String> {
    page(
        "Rent land in Galicia",
        "<h1>Finca Airbnb</h1><p>Rent a plot, grow your own.</p>\
         <nav><a href=\"/login\">Sign in</a> <a href=\"/register\">Create account</a></nav>",
    )
}

/// `GET /login`: sign-in form. The `redirect` parameter is carried into the
/// form so the client can return after signing in.
pub async fn login(Query(query): Query<LoginQuery>) -> Html<String> {
    let target = guard::sanitize_redirect(query.redirect.as_deref());
    let body = format!(
        "<h1>Sign in</h1><form method=\"post\" action=\"/api/auth/login?redirect={}\" data-redirect=\"{}\">\
         <input name=\"email\" type=\"email\"><input name=\"password\" type=\"password\">\
         <label><input name=\"rememberMe\" type=\"checkbox\"> Remember me</label>\
         <button type=\"submit\">Sign in</button></form>\
         <a href=\"/forgot-password\">Forgot your password?</a>",
        urlencoding::encode(&target),
        encode_double_quoted_attribute(&target),
    );
    page("Sign in", &body)
}

/// `GET /register`: sign-up form.
pub async fn register() -> Html<String> {
    page(
        "Create account",
        "<h1>Create account</h1><form method=\"post\" action=\"/api/auth/register\">\
         <input name=\"name\"><input name=\"email\" type=\"email\"><input name=\"phone\" type=\"tel\">\
         <input name=\"password\" type=\"password\"><input name=\"confirmPassword\" type=\"password\">\
         <label><input name=\"acceptTerms\" type=\"checkbox\"> I accept the terms</label>\
         <label><input name=\"newsletter\" type=\"checkbox\"> Newsletter</label>\
         <button type=\"submit\">Create account</button></form>",
    )
}

/// `GET /forgot-password`: recovery form.
pub async fn forgot_password() -> Html<String> {
    page(
        "Recover password",
        "<h1>Recover password</h1><form method=\"post\" action=\"/api/auth/forgot-password\">\
         <input name=\"email\" type=\"email\"><button type=\"submit\">Send instructions</button></form>",
    )
}

/// `GET /dashboard`: protected area. The navigation guard has already
/// checked the cookie; an unknown user still falls back to the login page.
pub async fn dashboard(auth: Result<AuthUser, super::auth::ApiError>, uri: axum::http::Uri) -> Response {
    let Ok(auth) = auth else {
        return Redirect::temporary(&guard::login_redirect(uri.path())).into_response();
    };
    let body = format!(
        "<h1>Welcome, {}</h1><p>{}</p><form method=\"post\" action=\"/api/auth/logout\"><button>Sign out</button></form>",
        encode_text(&auth.user.name),
        encode_text(&auth.user.email),
    );
    page("Dashboard", &body).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
