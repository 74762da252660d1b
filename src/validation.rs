//! Form-level field validation applied before auth operations run.
//!
//! The rules are `validator` derives on the request types in `types`. This
//! module holds the custom rules those derives call and flattens
//! `ValidationErrors` into one [`FieldError`] per field, in form order, with
//! the camelCase field names the forms use.

use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub const MIN_PASSWORD_LEN: usize = 8;
/// E.164 allows at most 15 digits.
const MAX_PHONE_DIGITS: usize = 15;

/// Errors are reported in this order regardless of map iteration order.
const FIELD_ORDER: &[&str] = &["name", "email", "password", "confirm_password", "phone", "accept_terms"];

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

// =============================================================================
// CUSTOM RULES
// =============================================================================

/// One uppercase letter and one digit. Length is a separate `length` rule.
///
/// # Errors
///
/// The first missing character class.
pub fn strong_password(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule_error("uppercase", "Password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule_error("digit", "Password must contain at least one number"));
    }
    Ok(())
}

/// Optional `+`, then 2..=15 digits with no leading zero and nothing else.
/// A blank value counts as no phone.
///
/// # Errors
///
/// `phone` when the value does not match.
pub fn phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        return Ok(());
    }
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=MAX_PHONE_DIGITS).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if valid { Ok(()) } else { Err(rule_error("phone", "Invalid phone format")) }
}

/// # Errors
///
/// `accepted` when the box is unchecked.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn accepted(checked: &bool) -> Result<(), ValidationError> {
    if *checked { Ok(()) } else { Err(rule_error("accepted", "You must accept the terms and conditions")) }
}

// =============================================================================
// FORMS
// =============================================================================

/// Run a form's declared rules.
///
/// # Errors
///
/// One entry per failing field.
pub fn check<T: Validate>(form: &T) -> Result<(), Vec<FieldError>> {
    form.validate().map_err(|errors| field_errors(&errors))
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut ranked: Vec<(usize, FieldError)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            let name: &str = field.as_ref();
            let first = list.iter().min_by_key(|e| rule_rank(e.code.as_ref()))?;
            let rank = FIELD_ORDER.iter().position(|f| *f == name).unwrap_or(FIELD_ORDER.len());
            Some((rank, FieldError::new(camel_case(name), describe(name, first))))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, error)| error).collect()
}

/// Presence before format before everything else.
fn rule_rank(code: &str) -> u8 {
    match code {
        "length" => 0,
        "email" => 1,
        _ => 2,
    }
}

fn describe(field: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Field '{field}' is invalid ({})", error.code),
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
