// ============================
// crates/auth-core/src/mailer.rs
// ============================
//! Outbound notification contract. The core only defines the interface;
//! the transport behind it is interchangeable.
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::config::MailerSettings;
use crate::error::AuthError;

/// A message handed to the notification dispatcher
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for email transports
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError>;
}

/// Mailer backed by an HTTP email API (Resend-style JSON endpoint with a
/// bearer key).
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(settings: &MailerSettings) -> Self {
        // bounded timeout: a slow provider surfaces as Unavailable,
        // never as a hang
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            from: settings.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError> {
        let payload = json!({
            "from": self.from,
            "to": email.to,
            "subject": email.subject,
            "html": email.body,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!(
                "mail provider returned {status}"
            )));
        }
        Ok(())
    }
}

/// Mailer that records every message instead of sending it. Lets tests
/// observe dispatches without any network access.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AuthError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}
