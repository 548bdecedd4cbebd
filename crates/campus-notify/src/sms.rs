use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;

use crate::{NotificationChannel, StatusChange};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_url: String,
    pub api_key: String,
    /// Destination number; SMS is skipped when unset.
    pub to: Option<String>,
}

/// Tertiary channel: short message through a third-party SMS API
/// (Twilio-style JSON POST).
pub struct SmsChannel {
    client: Client,
    config: SmsConfig,
}

impl SmsChannel {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    async fn send(&self, change: &StatusChange) -> Result<()> {
        let to = self
            .config
            .to
            .as_deref()
            .ok_or_else(|| anyhow!("no SMS destination configured"))?;

        let message = format!(
            "Ticket #{} ({}) {} durumuna geçmiştir.",
            change.ticket_id, change.title, change.new_status
        );

        self.client
            .post(&self.config.api_url)
            .timeout(REQUEST_TIMEOUT)
            .json(&serde_json::json!({
                "to": to,
                "message": message,
                "api_key": self.config.api_key,
            }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
