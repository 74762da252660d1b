//! Auth routes: login/register/recovery/logout, current user, and the token
//! cookie.
//!
//! The POST routes take either a JSON body or an urlencoded HTML form. A JSON
//! caller gets the session body back; a form submission is answered with a
//! `303` to the next page so the browser follows it. Errors are JSON either
//! way.

use axum::extract::{FromRef, FromRequest, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::guard;
use crate::session::storage::TOKEN_KEY;
use crate::state::AppState;
use crate::token;
use crate::types::{AuthError, AuthErrorKind, LoginCredentials, RegisterData, ResetRequest, User};
use crate::validation::{self, FieldError};

/// The cookie shares its name with the persisted storage key.
pub const TOKEN_COOKIE: &str = TOKEN_KEY;
const REMEMBER_MAX_AGE: Duration = Duration::hours(24);

fn token_cookie(value: String, secure: bool, max_age: Option<Duration>) -> Cookie<'static> {
    let mut builder = Cookie::build((TOKEN_COOKIE, value)).path("/").http_only(true).same_site(SameSite::Lax).secure(secure);
    if let Some(age) = max_age {
        builder = builder.max_age(age);
    }
    builder.build()
}

// =============================================================================
// ERRORS
// =============================================================================

/// Handler error rendered as `{code, message, field}` or `{code, errors}`.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Validation(Vec<FieldError>),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

#[must_use]
pub fn status_for(kind: AuthErrorKind) -> StatusCode {
    match kind {
        AuthErrorKind::UserNotFound => StatusCode::NOT_FOUND,
        AuthErrorKind::InvalidCredentials | AuthErrorKind::SessionExpired => StatusCode::UNAUTHORIZED,
        AuthErrorKind::EmailAlreadyExists => StatusCode::CONFLICT,
        AuthErrorKind::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        AuthErrorKind::NetworkError => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => (status_for(e.kind), Json(e)).into_response(),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "code": "VALIDATION_FAILED", "errors": errors })),
            )
                .into_response(),
        }
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the token cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(TOKEN_COOKIE).map(Cookie::value).unwrap_or_default();
        let claims = token::validate(token).map_err(|_| AuthError::session_expired())?;

        let app_state = AppState::from_ref(state);
        let user = app_state.auth.user_by_id(&claims.user_id).await.ok_or_else(AuthError::session_expired)?;

        Ok(Self { user })
    }
}

// =============================================================================
// BODY EXTRACTOR
// =============================================================================

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn is_form_submission(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

/// Request body from either a JSON client or an HTML form.
pub struct Submission<T> {
    pub data: T,
    pub from_form: bool,
}

impl<T, S> FromRequest<S> for Submission<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form_submission(req.headers()) {
            let Form(data) = Form::<T>::from_request(req, state).await.map_err(IntoResponse::into_response)?;
            Ok(Self { data, from_form: true })
        } else {
            let Json(data) = Json::<T>::from_request(req, state).await.map_err(IntoResponse::into_response)?;
            Ok(Self { data, from_form: false })
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    redirect: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
    /// Where the client should navigate next.
    pub redirect: String,
}

/// `POST /api/auth/login`: check credentials and set the token cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<RedirectQuery>,
    Submission { data: creds, from_form }: Submission<LoginCredentials>,
) -> Result<Response, ApiError> {
    validation::check(&creds)?;
    let grant = state.auth.login(&creds).await?;

    let max_age = creds.remember_me.then_some(REMEMBER_MAX_AGE);
    let jar = jar.add(token_cookie(grant.token.clone(), state.cookie_secure, max_age));
    let redirect = guard::sanitize_redirect(query.redirect.as_deref());
    if from_form {
        return Ok((jar, Redirect::to(&redirect)).into_response());
    }
    Ok((jar, Json(SessionResponse { user: grant.user, token: grant.token, redirect })).into_response())
}

/// `POST /api/auth/register`: create an account and sign it in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Submission { data, from_form }: Submission<RegisterData>,
) -> Result<Response, ApiError> {
    validation::check(&data)?;
    let grant = state.auth.register(&data).await?;

    let jar = jar.add(token_cookie(grant.token.clone(), state.cookie_secure, Some(REMEMBER_MAX_AGE)));
    if from_form {
        return Ok((jar, Redirect::to(guard::DASHBOARD_PATH)).into_response());
    }
    let body = SessionResponse { user: grant.user, token: grant.token, redirect: guard::DASHBOARD_PATH.to_owned() };
    Ok((StatusCode::CREATED, jar, Json(body)).into_response())
}

/// `POST /api/auth/forgot-password`: accept a recovery request.
///
/// The reset token never leaves the server; the response only acknowledges.
pub async fn forgot_password(
    State(state): State<AppState>,
    Submission { data: req, from_form }: Submission<ResetRequest>,
) -> Result<Response, ApiError> {
    validation::check(&req)?;
    state.auth.request_password_reset(&req.email).await?;
    if from_form {
        return Ok(Redirect::to(guard::LOGIN_PATH).into_response());
    }
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "email": req.email, "message": "Recovery instructions sent" })),
    )
        .into_response())
}

/// `POST /api/auth/logout`: clear the token cookie. Always succeeds.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie = token_cookie(String::new(), state.cookie_secure, Some(Duration::ZERO));
    let jar = CookieJar::new().add(cookie);
    if is_form_submission(&headers) {
        (jar, Redirect::to("/")).into_response()
    } else {
        (jar, StatusCode::NO_CONTENT).into_response()
    }
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
