//! Session token codec.
//!
//! DESIGN
//! ======
//! Tokens are three base64 segments joined by `.`: a fixed header, a JSON
//! payload `{userId, iat, exp}` with millisecond timestamps, and a constant
//! placeholder signature. Nothing is signed; any caller can mint a token.
//! Expiry is the only property `validate` enforces, and both the session
//! store and the navigation guard go through it so they agree on validity.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const SIGNATURE: &str = "mock-signature";

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issue time, unix milliseconds.
    pub iat: i64,
    /// Expiry, unix milliseconds.
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
}

/// Current wall-clock time in unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

/// Issue a token for `user_id` valid for [`TOKEN_TTL_MS`] from now.
#[must_use]
pub fn issue(user_id: &str) -> String {
    issue_at(user_id, now_millis())
}

/// Issue a token as if the current time were `now_ms`.
#[must_use]
pub fn issue_at(user_id: &str, now_ms: i64) -> String {
    let claims = Claims { user_id: user_id.to_owned(), iat: now_ms, exp: now_ms.saturating_add(TOKEN_TTL_MS) };
    encode(&claims)
}

/// Encode arbitrary claims into the three-segment format.
#[must_use]
pub fn encode(claims: &Claims) -> String {
    // Serializing a struct of strings and integers cannot fail.
    let payload = serde_json::to_string(claims).unwrap_or_default();
    format!("{}.{}.{}", STANDARD.encode(HEADER_JSON), STANDARD.encode(payload), STANDARD.encode(SIGNATURE))
}

/// Validate `token` against the current time.
///
/// # Errors
///
/// [`TokenError::Malformed`] unless the token has exactly three segments with
/// a decodable payload; [`TokenError::Expired`] once `exp <= now`.
pub fn validate(token: &str) -> Result<Claims, TokenError> {
    validate_at(token, now_millis())
}

/// Validate `token` as if the current time were `now_ms`.
///
/// # Errors
///
/// See [`validate`].
pub fn validate_at(token: &str, now_ms: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let raw = STANDARD.decode(payload).map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;

    if claims.exp <= now_ms {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
