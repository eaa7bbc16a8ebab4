// ============================
// crates/auth-core/src/error.rs
// ============================
//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

/// Authentication error types with error codes and context
#[derive(Error, Debug)]
pub enum AuthError {
    /// Deliberately conflates "unknown email" and "wrong password" so the
    /// caller cannot enumerate accounts. The audit log distinguishes them.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email is already registered")]
    DuplicateEmail,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("token has already been used")]
    TokenConsumed,

    #[error("session has been revoked")]
    SessionRevoked,

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("too many failed sign-in attempts")]
    RateLimited,

    #[error("user not found")]
    UserNotFound,

    /// Transient storage failure, safe for the caller to retry.
    #[error("storage error: {0}")]
    Storage(String),

    /// Downstream mail provider failure. Never fails the forgot-password
    /// request itself; surfaced only from direct mailer calls.
    #[error("mail provider unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenConsumed
            | AuthError::SessionRevoked => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "AUTH_001",
            AuthError::DuplicateEmail => "AUTH_002",
            AuthError::SessionRevoked => "AUTH_003",
            AuthError::InvalidToken => "TOKEN_001",
            AuthError::TokenExpired => "TOKEN_002",
            AuthError::TokenConsumed => "TOKEN_003",
            AuthError::Validation(_) => "VAL_001",
            AuthError::RateLimited => "RATE_001",
            AuthError::UserNotFound => "NF_001",
            AuthError::Storage(_) => "STORE_001",
            AuthError::Unavailable(_) => "MAIL_001",
            AuthError::Internal(_) => "INT_001",
            AuthError::Io(_) => "IO_001",
            AuthError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::DuplicateEmail => "Email is already registered".to_string(),
            AuthError::InvalidToken => "Link is invalid".to_string(),
            AuthError::TokenExpired => "Link has expired".to_string(),
            AuthError::TokenConsumed => "Link has already been used".to_string(),
            AuthError::SessionRevoked => "Session is no longer valid".to_string(),
            AuthError::Validation(e) => e.to_string(),
            AuthError::RateLimited => {
                "Too many sign-in attempts, please try again later".to_string()
            },
            AuthError::UserNotFound => "Resource not found".to_string(),
            AuthError::Storage(_) => "Temporary storage problem, please retry".to_string(),
            AuthError::Unavailable(_) => "Service temporarily unavailable".to_string(),
            AuthError::Internal(_) | AuthError::Io(_) => {
                "An internal server error occurred".to_string()
            },
            AuthError::Json(_) => "Invalid request format".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AuthError {
    fn from(msg: String) -> Self {
        AuthError::Internal(msg)
    }
}

impl From<&str> for AuthError {
    fn from(msg: &str) -> Self {
        AuthError::Internal(msg.to_string())
    }
}
