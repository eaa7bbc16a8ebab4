// ============================
// crates/auth-core/src/validation.rs
// ============================
//! Input-shape validation, checked before any storage or hashing work.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// RFC 5321 SMTP limit
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("password must be at least {min} characters long")]
    WeakPassword { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid redirect URL: {0}")]
    InvalidRedirectUrl(String),

    #[error("name must not be empty")]
    EmptyName,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Normalize an email for storage and lookup: trimmed, lowercased.
/// All store operations receive emails in this form, which is what makes
/// `Foo@Example.com` and `foo@example.com` the same account.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate the shape of an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(email)
}

/// Validate a redirect base URL for the reset link
pub fn validate_redirect_url(url: &str) -> ValidationResult<&str> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ValidationError::InvalidRedirectUrl(url.to_string()))
    }
}

/// Validate a display name
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name)
}
