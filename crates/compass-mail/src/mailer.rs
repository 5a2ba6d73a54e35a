use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::MailError;

const SENDGRID_API_BASE: &str = "https://api.sendgrid.com/v3";

/// A rendered plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Delivers through the SendGrid v3 mail-send endpoint.
pub struct SendGridMailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
    base_url: String,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            from: from.into(),
            base_url: SENDGRID_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn payload(&self, email: &Email) -> serde_json::Value {
        let mut to = json!({ "email": email.to });
        if let Some(name) = &email.to_name {
            to["name"] = json!(name);
        }
        json!({
            "personalizations": [{ "to": [to] }],
            "from": { "email": self.from },
            "subject": email.subject,
            "content": [{ "type": "text/plain", "value": email.body }],
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let response = self
            .http
            .post(format!("{}/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.payload(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "email not configured, message logged"
        );
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Email>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            to: "ada@example.com".into(),
            to_name: Some("Ada".into()),
            subject: "Hello".into(),
            body: "Body".into(),
        }
    }

    #[test]
    fn sendgrid_payload_shape() {
        let mailer = SendGridMailer::new("key", "noreply@compass.test").unwrap();
        let payload = mailer.payload(&email());
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "ada@example.com");
        assert_eq!(payload["personalizations"][0]["to"][0]["name"], "Ada");
        assert_eq!(payload["from"]["email"], "noreply@compass.test");
        assert_eq!(payload["content"][0]["type"], "text/plain");
    }

    #[tokio::test]
    async fn memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        mailer.send(&email()).await.unwrap();
        LogMailer.send(&email()).await.unwrap();
        assert_eq!(mailer.sent().await, vec![email()]);
    }
}
