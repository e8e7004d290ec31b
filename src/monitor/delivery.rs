//! Report delivery collaborators.
//!
//! Delivery is all-or-nothing: any failure means "report not delivered" and
//! the cycle's watermark does not advance. There is no partial-success
//! concept and the core never retries a send — the next cycle re-runs whole.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::error::{OpsError, Result};

/// External delivery collaborator (mail relay, chat bridge, ...).
#[async_trait]
pub trait ReportDelivery: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    body: &'a str,
    recipients: &'a [String],
}

/// Posts reports as JSON to a configured webhook endpoint.
pub struct WebhookDelivery {
    client: reqwest::Client,
    url: String,
    recipients: Vec<String>,
}

impl WebhookDelivery {
    pub fn new(url: String, recipients: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            recipients,
        }
    }

    fn payload<'a>(&'a self, subject: &'a str, body: &'a str) -> WebhookPayload<'a> {
        WebhookPayload {
            subject,
            body,
            recipients: &self.recipients,
        }
    }
}

#[async_trait]
impl ReportDelivery for WebhookDelivery {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(subject, body))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OpsError::Delivery {
                message: format!("webhook returned status {}", response.status()),
            });
        }

        info!(subject, recipients = self.recipients.len(), "report delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_subject_body_and_recipients() {
        let delivery = WebhookDelivery::new(
            "https://hooks.example.com/fintx".to_string(),
            vec!["ops@example.com".to_string()],
        );
        let json =
            serde_json::to_value(delivery.payload("[FinTx] 2 new errors, health OK", "body"))
                .expect("serialize");
        assert_eq!(json["subject"], "[FinTx] 2 new errors, health OK");
        assert_eq!(json["body"], "body");
        assert_eq!(json["recipients"][0], "ops@example.com");
    }
}
