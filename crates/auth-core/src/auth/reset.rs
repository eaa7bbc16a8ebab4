// ============================
// crates/auth-core/src/auth/reset.rs
// ============================
//! Single-use, time-bounded password-reset tokens.
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::token::generate_secure_token;
use crate::error::AuthError;

/// Default reset-token TTL: 1 hour
pub const DEFAULT_RESET_TTL_SECS: u64 = 60 * 60;

/// A password-reset token. Consumed exactly once; consumption is flipped
/// atomically with the validation that authorizes it.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

#[derive(Default)]
struct ResetState {
    by_token: HashMap<String, ResetToken>,
    // at most one live token per user; the value is the current token
    by_user: HashMap<Uuid, String>,
}

/// Manager for outstanding reset tokens.
#[derive(Clone)]
pub struct ResetTokenManager {
    state: Arc<RwLock<ResetState>>,
    ttl: Duration,
}

impl ResetTokenManager {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(ResetState::default())),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue a token for a user, invalidating any prior outstanding token
    /// for that user. A stale link from an earlier request can never be
    /// redeemed after a newer request.
    pub async fn issue(&self, user_id: Uuid) -> ResetToken {
        let now = Utc::now();
        let token = ResetToken {
            token: generate_secure_token(),
            user_id,
            issued_at: now,
            expires_at: now + self.ttl,
            consumed: false,
        };

        let mut state = self.state.write().await;
        if let Some(prior) = state.by_user.insert(user_id, token.token.clone()) {
            state.by_token.remove(&prior);
        }
        state.by_token.insert(token.token.clone(), token.clone());

        counter!("auth.reset_tokens_issued").increment(1);
        token
    }

    /// Validate a token and mark it consumed, both under one write lock.
    /// Exactly one of any set of concurrent callers gets the token back;
    /// the rest see `TokenConsumed`.
    pub async fn begin_redeem(&self, token: &str) -> Result<ResetToken, AuthError> {
        let mut state = self.state.write().await;
        let entry = state.by_token.get_mut(token).ok_or(AuthError::InvalidToken)?;

        if entry.consumed {
            return Err(AuthError::TokenConsumed);
        }
        if Utc::now() >= entry.expires_at {
            return Err(AuthError::TokenExpired);
        }

        entry.consumed = true;
        Ok(entry.clone())
    }

    /// Compensating rollback for `begin_redeem`: if the credential write
    /// that the token authorized could not be applied, the token becomes
    /// redeemable again instead of being burned for nothing.
    pub async fn unconsume(&self, token: &str) {
        let mut state = self.state.write().await;
        if let Some(entry) = state.by_token.get_mut(token) {
            entry.consumed = false;
        }
    }

    /// Drop expired tokens from the table
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let now = Utc::now();
        let before = state.by_token.len();

        state.by_token.retain(|_, entry| now < entry.expires_at);

        let by_token = &state.by_token;
        state.by_user.retain(|_, token| by_token.contains_key(token));

        before - state.by_token.len()
    }
}
