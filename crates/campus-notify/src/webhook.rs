use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::{NotificationChannel, StatusChange};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Secondary channel: JSON POST to a configured endpoint. Slack webhook
/// URLs get Slack's `text` payload shape; anything else gets the generic
/// notification document with an optional bearer key.
pub struct WebhookChannel {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl WebhookChannel {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }

    fn is_slack(&self) -> bool {
        self.url.contains("hooks.slack.com")
    }

    fn payload(&self, change: &StatusChange) -> serde_json::Value {
        if self.is_slack() {
            let mut lines = vec![
                format!("Ticket *{}* - *{}*", change.ticket_id, change.title),
                format!("Durum: {} -> {}", change.old_status, change.new_status),
            ];
            if let Some(resolver) = &change.resolver {
                lines.push(format!("Çözen: {}", resolver));
            }
            let short = change.short_description();
            if !short.is_empty() {
                lines.push(format!("Açıklama: {}", short));
            }
            serde_json::json!({ "text": lines.join("\n") })
        } else {
            serde_json::json!({
                "ticket_id": change.ticket_id,
                "title": change.title,
                "old_status": change.old_status,
                "new_status": change.new_status,
                "short_description": change.short_description(),
                "resolver": change.resolver,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, change: &StatusChange) -> Result<()> {
        let mut request = self
            .client
            .post(&self.url)
            .timeout(REQUEST_TIMEOUT)
            .json(&self.payload(change));

        if !self.is_slack() {
            if let Some(key) = self.api_key.as_deref().filter(|k| *k != "placeholder") {
                request = request.bearer_auth(key);
            }
        }

        request.send().await?.error_for_status()?;
        Ok(())
    }
}
