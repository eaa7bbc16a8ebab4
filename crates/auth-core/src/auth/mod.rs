// ============================
// crates/auth-core/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod rate_limit;
pub mod reset;
pub mod service;
pub mod session;
pub mod token;

pub use password::{hash_password, verify_password, PasswordPolicy, MIN_PASSWORD_LENGTH};
pub use rate_limit::AuthRateLimiter;
pub use reset::{ResetToken, ResetTokenManager, DEFAULT_RESET_TTL_SECS};
pub use service::AuthService;
pub use session::{Session, SessionManager, DEFAULT_SESSION_TTL_SECS};
pub use token::generate_secure_token;
