use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers::test_app_state;
use crate::token;

fn router() -> Router {
    app(test_app_state(), None)
}

async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

fn get_req(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("fincairbnb_token={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn cookie_token(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("fincairbnb_token="))
        .unwrap_or_default()
        .to_owned()
}

// =============================================================================
// health + public pages
// =============================================================================

#[tokio::test]
async fn healthz_ok() {
    let response = send(&router(), get_req("/healthz", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn home_is_public() {
    let response = send(&router(), get_req("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("Finca Airbnb"));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let response = send(&router(), get_req("/nope", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// navigation guard
// =============================================================================

#[tokio::test]
async fn dashboard_without_cookie_redirects_to_login() {
    let response = send(&router(), get_req("/dashboard", None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn nested_dashboard_path_is_guarded() {
    let response = send(&router(), get_req("/dashboard/fincas", None)).await;
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard%2Ffincas");
}

#[tokio::test]
async fn dashboard_with_expired_cookie_redirects() {
    let expired = token::issue_at("1", 1_000);
    let response = send(&router(), get_req("/dashboard", Some(&expired))).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn dashboard_with_valid_cookie_renders_user() {
    let token = token::issue("2");
    let response = send(&router(), get_req("/dashboard", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(text_body(response).await.contains("María do Campo"));
}

#[tokio::test]
async fn dashboard_with_token_for_unknown_user_falls_back_to_login() {
    let token = token::issue("404");
    let response = send(&router(), get_req("/dashboard", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login?redirect=%2Fdashboard");
}

#[tokio::test]
async fn login_page_with_valid_cookie_redirects_to_dashboard() {
    let token = token::issue("1");
    for path in ["/login", "/register", "/forgot-password"] {
        let response = send(&router(), get_req(path, Some(&token))).await;
        assert_eq!(location(&response), "/dashboard", "path {path}");
    }
}

#[tokio::test]
async fn api_paths_are_not_redirected() {
    let response = send(&router(), get_req("/api/auth/me", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// auth API
// =============================================================================

#[tokio::test]
async fn login_sets_cookie_and_unlocks_dashboard() {
    let router = router();
    let body = serde_json::json!({"email": "xose@example.com", "password": "Password123"});
    let response = send(&router, post_json("/api/auth/login?redirect=/dashboard/fincas", &body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("Max-Age"));
    let token = cookie_token(&cookie);

    let json = json_body(response).await;
    assert_eq!(json["user"]["id"], "1");
    assert_eq!(json["redirect"], "/dashboard/fincas");
    assert_eq!(json["token"], token.as_str());

    let page = send(&router, get_req("/dashboard", Some(&token))).await;
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_remember_me_sets_max_age() {
    let body = serde_json::json!({"email": "maria@example.com", "password": "Password123", "rememberMe": true});
    let response = send(&router(), post_json("/api/auth/login", &body)).await;
    assert!(set_cookie(&response).contains("Max-Age=86400"));
    assert_eq!(json_body(response).await["redirect"], "/dashboard");
}

#[tokio::test]
async fn login_rejects_foreign_redirect() {
    let body = serde_json::json!({"email": "xose@example.com", "password": "Password123"});
    let response = send(&router(), post_json("/api/auth/login?redirect=https://evil.example", &body)).await;
    assert_eq!(json_body(response).await["redirect"], "/dashboard");
}

#[tokio::test]
async fn login_wrong_password_is_401_on_password_field() {
    let body = serde_json::json!({"email": "xose@example.com", "password": "wrong"});
    let response = send(&router(), post_json("/api/auth/login", &body)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert_eq!(json["field"], "password");
}

#[tokio::test]
async fn login_unknown_user_is_404() {
    let body = serde_json::json!({"email": "ghost@example.com", "password": "Password123"});
    let response = send(&router(), post_json("/api/auth/login", &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_bad_email_is_422() {
    let body = serde_json::json!({"email": "not-an-email", "password": "x"});
    let response = send(&router(), post_json("/api/auth/login", &body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["code"], "VALIDATION_FAILED");
    assert_eq!(json["errors"][0]["field"], "email");
}

#[tokio::test]
async fn register_creates_account_and_cookie() {
    let router = router();
    let body = serde_json::json!({
        "name": "Iago",
        "email": "iago@example.com",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "acceptTerms": true,
    });
    let response = send(&router, post_json("/api/auth/register", &body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let token = cookie_token(&set_cookie(&response));

    let me = send(&router, get_req("/api/auth/me", Some(&token))).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(json_body(me).await["email"], "iago@example.com");
}

#[tokio::test]
async fn register_duplicate_is_409() {
    let body = serde_json::json!({
        "name": "Xosé",
        "email": "xose@example.com",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "acceptTerms": true,
    });
    let response = send(&router(), post_json("/api/auth/register", &body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn register_without_terms_is_422() {
    let body = serde_json::json!({
        "name": "Iago",
        "email": "iago2@example.com",
        "password": "Secret123",
        "confirmPassword": "Secret123",
    });
    let response = send(&router(), post_json("/api/auth/register", &body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["errors"][0]["field"], "acceptTerms");
}

#[tokio::test]
async fn forgot_password_known_email_is_accepted() {
    let body = serde_json::json!({"email": "maria@example.com"});
    let response = send(&router(), post_json("/api/auth/forgot-password", &body)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = json_body(response).await;
    assert!(json.get("token").is_none());
}

#[tokio::test]
async fn forgot_password_unknown_email_is_404() {
    let body = serde_json::json!({"email": "ghost@example.com"});
    let response = send(&router(), post_json("/api/auth/forgot-password", &body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["field"], "email");
}

#[tokio::test]
async fn logout_clears_cookie() {
    let request = Request::builder().method("POST").uri("/api/auth/logout").body(Body::empty()).unwrap();
    let response = send(&router(), request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("fincairbnb_token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// =============================================================================
// HTML form submissions
// =============================================================================

#[tokio::test]
async fn login_form_redirects_with_cookie() {
    let router = router();
    let body = "email=xose%40example.com&password=Password123&rememberMe=on";
    let response = send(&router, post_form("/api/auth/login?redirect=%2Fdashboard%2Ffincas", body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/fincas");

    let cookie = set_cookie(&response);
    assert!(cookie.contains("Max-Age=86400"));
    let page = send(&router, get_req("/dashboard", Some(&cookie_token(&cookie)))).await;
    assert_eq!(page.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_form_without_checkbox_is_session_cookie() {
    let response = send(&router(), post_form("/api/auth/login", "email=maria%40example.com&password=Password123")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert!(!set_cookie(&response).contains("Max-Age"));
}

#[tokio::test]
async fn login_form_errors_stay_json() {
    let response = send(&router(), post_form("/api/auth/login", "email=xose%40example.com&password=wrong")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn register_form_redirects_to_dashboard() {
    let body = "name=Iago&email=iago%40example.com&phone=&password=Secret123&confirmPassword=Secret123&acceptTerms=on";
    let response = send(&router(), post_form("/api/auth/register", body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    assert!(set_cookie(&response).contains("Max-Age=86400"));
}

#[tokio::test]
async fn register_form_without_terms_is_422() {
    let body = "name=Iago&email=iago%40example.com&password=Secret123&confirmPassword=Secret123";
    let response = send(&router(), post_form("/api/auth/register", body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["errors"][0]["field"], "acceptTerms");
}

#[tokio::test]
async fn forgot_password_form_returns_to_login() {
    let response = send(&router(), post_form("/api/auth/forgot-password", "email=maria%40example.com")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn logout_form_returns_home() {
    let response = send(&router(), post_form("/api/auth/logout", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(set_cookie(&response).contains("Max-Age=0"));
}

#[tokio::test]
async fn me_with_garbage_cookie_is_401() {
    let response = send(&router(), get_req("/api/auth/me", Some("a.b"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "SESSION_EXPIRED");
}
