// ============================
// crates/auth-core/src/lib.rs
// ============================
//! Authentication core: credential storage, password hashing, session and
//! reset-token lifecycle, and the HTTP surface that exposes them.

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::mailer::Mailer;
use crate::store::UserStore;

/// Application state shared across all handlers
pub struct AppState<S: UserStore> {
    /// Authentication service
    pub service: Arc<AuthService<S>>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl<S: UserStore> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, settings: Settings, mailer: Arc<dyn Mailer>) -> Self {
        let service = Arc::new(AuthService::new(store, mailer, &settings));
        Self {
            service,
            settings: Arc::new(settings),
        }
    }
}
