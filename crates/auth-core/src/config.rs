// ============================
// crates/auth-core/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::auth::reset::DEFAULT_RESET_TTL_SECS;
use crate::auth::session::DEFAULT_SESSION_TTL_SECS;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory for the flat-file credential store
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Reset-token TTL in seconds. Short-lived: a leaked reset token
    /// grants account takeover.
    pub reset_token_ttl_secs: u64,
    /// Minimum accepted password length
    pub min_password_length: usize,
    /// Outbound mail settings
    pub mailer: MailerSettings,
}

/// Settings for the HTTP email provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerSettings {
    /// Email API endpoint
    pub endpoint: String,
    /// Provider API key
    pub api_key: String,
    /// From address for outbound mail
    pub from: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            reset_token_ttl_secs: DEFAULT_RESET_TTL_SECS,
            min_password_length: MIN_PASSWORD_LENGTH,
            mailer: MailerSettings::default(),
        }
    }
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from: "Acme <onboarding@resend.dev>".to_string(),
        }
    }
}

impl Settings {
    /// Load settings: built-in defaults, then `config.toml`, then
    /// `AUTHD_*` environment variables (double underscore for nesting,
    /// e.g. `AUTHD_MAILER__API_KEY`).
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings with an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("AUTHD_").split("__"))
            .extract()?;

        Ok(settings)
    }
}
