// ============================
// crates/auth-core/src/auth/service.rs
// ============================
//! The orchestrator: composes store, hasher, session and reset-token
//! managers, and the notification dispatcher into the four public
//! authentication operations.
use metrics::counter;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::password::{self, PasswordPolicy};
use crate::auth::rate_limit::AuthRateLimiter;
use crate::auth::reset::ResetTokenManager;
use crate::auth::session::{Session, SessionManager};
use crate::config::Settings;
use crate::error::AuthError;
use crate::mailer::{Mailer, OutboundEmail};
use crate::store::{NewUser, User, UserStore};
use crate::validation::{self, ValidationError};

/// Authentication service over a pluggable credential store.
pub struct AuthService<S: UserStore> {
    store: S,
    sessions: SessionManager,
    reset_tokens: ResetTokenManager,
    mailer: Arc<dyn Mailer>,
    policy: PasswordPolicy,
    rate_limiter: AuthRateLimiter,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, mailer: Arc<dyn Mailer>, settings: &Settings) -> Self {
        Self {
            store,
            sessions: SessionManager::new(settings.session_ttl_secs),
            reset_tokens: ResetTokenManager::new(settings.reset_token_ttl_secs),
            mailer,
            policy: PasswordPolicy {
                min_length: settings.min_password_length,
            },
            rate_limiter: AuthRateLimiter::default(),
        }
    }

    /// The session manager, for token validation and logout
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Register a new account and sign it in.
    /// Input-shape errors are rejected before any storage or hashing work.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: String,
    ) -> Result<(User, Session), AuthError> {
        validation::validate_name(name)?;
        let email = validation::normalize_email(email);
        validation::validate_email(&email)?;
        if !self.policy.check(&password) {
            return Err(ValidationError::WeakPassword {
                min: self.policy.min_length,
            }
            .into());
        }

        let hash = hash_blocking(password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email,
                password_hash: hash,
            })
            .await?;

        counter!("auth.signups").increment(1);
        info!(user_id = %user.id, "user registered");

        // sign-up is treated like sign-in: the caller gets a live session
        let session = self.sessions.issue(user.id).await;
        Ok((user, session))
    }

    /// Authenticate with email and password.
    /// Unknown email and wrong password return the same error so the
    /// response never reveals whether an account exists.
    pub async fn sign_in(&self, email: &str, password: String) -> Result<Session, AuthError> {
        let email = validation::normalize_email(email);

        if !self.rate_limiter.check(&email) {
            counter!("auth.signins_rate_limited").increment(1);
            return Err(AuthError::RateLimited);
        }

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(%email, "sign-in failed: unknown email");
                self.rate_limiter.record_failed_attempt(&email);
                counter!("auth.signins_failed").increment(1);
                return Err(AuthError::InvalidCredentials);
            },
        };

        let hash = user.password_hash.clone();
        let ok = task::spawn_blocking(move || password::verify_password(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {e}")))?;

        if !ok {
            debug!(user_id = %user.id, "sign-in failed: wrong password");
            self.rate_limiter.record_failed_attempt(&email);
            counter!("auth.signins_failed").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        self.rate_limiter.record_success(&email);
        counter!("auth.signins").increment(1);
        Ok(self.sessions.issue(user.id).await)
    }

    /// Revoke the session behind a bearer token
    pub async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.revoke(token).await
    }

    /// Validate a bearer token, returning the user it proves
    pub async fn validate_session(&self, token: &str) -> Result<Uuid, AuthError> {
        Ok(self.sessions.validate(token).await?.user_id)
    }

    /// Start password recovery for an email address.
    ///
    /// Always reports success: an unknown email simply skips dispatch, so
    /// the response is identical whether or not the account exists. The
    /// email send itself is fire-and-forget; the request has succeeded once
    /// the token is issued.
    pub async fn forgot_password(
        &self,
        email: &str,
        redirect_base_url: &str,
    ) -> Result<(), AuthError> {
        let email = validation::normalize_email(email);
        validation::validate_email(&email)?;
        validation::validate_redirect_url(redirect_base_url)?;

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                debug!(%email, "password recovery for unknown email, skipping dispatch");
                return Ok(());
            },
        };

        let reset = self.reset_tokens.issue(user.id).await;
        let url = format!("{redirect_base_url}?token={}", reset.token);
        info!(user_id = %user.id, "reset token issued");

        let mailer = Arc::clone(&self.mailer);
        let message = OutboundEmail {
            to: user.email,
            subject: "Reset your password".to_string(),
            body: format!("Click the link to reset your password: {url}"),
        };
        tokio::spawn(async move {
            if let Err(e) = mailer.send(message).await {
                counter!("auth.reset_emails_failed").increment(1);
                warn!(error = %e, "reset email dispatch failed");
            }
        });

        Ok(())
    }

    /// Redeem a reset token and set a new password.
    ///
    /// The token is consumed atomically with its validation; the password
    /// update and full session revocation follow, with a compensating
    /// rollback if the credential write fails.
    pub async fn reset_password(&self, token: &str, new_password: String) -> Result<(), AuthError> {
        if !self.policy.check(&new_password) {
            return Err(ValidationError::WeakPassword {
                min: self.policy.min_length,
            }
            .into());
        }

        let reset = self.reset_tokens.begin_redeem(token).await?;

        let hash = match hash_blocking(new_password).await {
            Ok(hash) => hash,
            Err(e) => {
                self.reset_tokens.unconsume(token).await;
                return Err(e);
            },
        };

        if let Err(e) = self.store.update_password_hash(reset.user_id, &hash).await {
            self.reset_tokens.unconsume(token).await;
            return Err(e);
        }

        // Defense in depth: a password reset invalidates every session
        let revoked = self.sessions.revoke_all(reset.user_id).await;
        counter!("auth.resets_redeemed").increment(1);
        info!(user_id = %reset.user_id, revoked, "password reset completed");

        Ok(())
    }

    /// Reclaim memory held by expired sessions, reset tokens, and stale
    /// rate-limit entries. Run periodically by the server; correctness
    /// never depends on it.
    pub async fn sweep_expired(&self) {
        let sessions = self.sessions.purge_expired().await;
        let tokens = self.reset_tokens.purge_expired().await;
        self.rate_limiter.cleanup();
        debug!(sessions, tokens, "expiry sweep complete");
    }
}

/// scrypt is intentionally slow; run it off the async executor and zeroize
/// the plaintext once hashed.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    task::spawn_blocking(move || {
        let mut plain = password;
        password::hash_password_secure(&mut plain)
    })
    .await
    .map_err(|e| AuthError::Internal(format!("hash task failed: {e}")))?
}
