// ============================
// crates/auth-core/src/auth/session.rs
// ============================
//! Session token handling and management.
use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::token::generate_secure_token;
use crate::error::AuthError;

/// Default session TTL: 7 days
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// An issued session. Once revoked or expired, a session is terminal;
/// there is no transition back to active.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

/// Session manager for bearer tokens.
///
/// Expiry is checked lazily at validate time; the sweeper only reclaims
/// memory and is not needed for correctness.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a session manager with the given token TTL in seconds
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue a new session for a user
    pub async fn issue(&self, user_id: Uuid) -> Session {
        let now = Utc::now();
        let session = Session {
            token: generate_secure_token(),
            user_id,
            issued_at: now,
            expires_at: now + self.ttl,
            revoked: false,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());

        counter!("auth.sessions_issued").increment(1);
        gauge!("auth.sessions_active").set(sessions.len() as f64);

        session
    }

    /// Validate a token, returning the session it proves.
    /// A token validates only while unrevoked and unexpired.
    pub async fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token).ok_or(AuthError::InvalidToken)?;

        if session.revoked {
            return Err(AuthError::SessionRevoked);
        }
        if Utc::now() >= session.expires_at {
            return Err(AuthError::TokenExpired);
        }
        Ok(session.clone())
    }

    /// Revoke a single session (logout)
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) => {
                session.revoked = true;
                counter!("auth.sessions_revoked").increment(1);
                Ok(())
            },
            None => Err(AuthError::InvalidToken),
        }
    }

    /// Revoke every session belonging to a user. Used on password change.
    pub async fn revoke_all(&self, user_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut revoked = 0;
        for session in sessions.values_mut() {
            if session.user_id == user_id && !session.revoked {
                session.revoked = true;
                revoked += 1;
            }
        }
        if revoked > 0 {
            counter!("auth.sessions_revoked").increment(revoked as u64);
        }
        revoked
    }

    /// Drop expired sessions from the table
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let before = sessions.len();

        sessions.retain(|_, session| now < session.expires_at);

        let removed = before - sessions.len();
        if removed > 0 {
            counter!("auth.sessions_expired").increment(removed as u64);
            gauge!("auth.sessions_active").set(sessions.len() as f64);
        }
        removed
    }
}
