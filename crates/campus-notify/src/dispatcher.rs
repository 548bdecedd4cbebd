use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::email::{EmailChannel, EmailConfig};
use crate::sms::{SmsChannel, SmsConfig};
use crate::webhook::WebhookChannel;
use crate::{NotificationChannel, StatusChange};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub email: Option<EmailConfig>,
    pub webhook_url: Option<String>,
    pub webhook_api_key: Option<String>,
    pub sms: Option<SmsConfig>,
}

/// Fan-out dispatcher over the configured channels, in priority order:
/// email first, then webhook, then SMS. Each channel gets MAX_ATTEMPTS
/// tries with linear backoff; the first success stops the cascade.
#[derive(Clone)]
pub struct Notifier {
    channels: Arc<Vec<Box<dyn NotificationChannel>>>,
}

impl Notifier {
    pub fn from_config(config: NotifyConfig) -> Self {
        let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();

        if let Some(email) = config.email {
            channels.push(Box::new(EmailChannel::new(email)));
        }
        if let Some(url) = config.webhook_url {
            channels.push(Box::new(WebhookChannel::new(url, config.webhook_api_key)));
        }
        if let Some(sms) = config.sms {
            channels.push(Box::new(SmsChannel::new(sms)));
        }

        Self::with_channels(channels)
    }

    pub fn with_channels(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    pub fn disabled() -> Self {
        Self::with_channels(Vec::new())
    }

    /// Fire-and-forget entry point: delivery runs on a detached task so a
    /// slow or failing channel can never delay the caller.
    pub fn notify(&self, change: StatusChange) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.deliver(&change).await;
        });
    }

    /// Returns whether any channel accepted the notification.
    pub async fn deliver(&self, change: &StatusChange) -> bool {
        if self.channels.is_empty() {
            warn!(
                "No notification channels configured, skipping notification for ticket {}",
                change.ticket_id
            );
            return false;
        }

        for channel in self.channels.iter() {
            if self.try_channel(channel.as_ref(), change).await {
                return true;
            }
        }

        error!(
            "All notification channels exhausted for ticket {} ({} -> {})",
            change.ticket_id, change.old_status, change.new_status
        );
        false
    }

    async fn try_channel(&self, channel: &dyn NotificationChannel, change: &StatusChange) -> bool {
        for attempt in 1..=MAX_ATTEMPTS {
            match channel.send(change).await {
                Ok(()) => {
                    info!(
                        "{} notification sent for ticket {}",
                        channel.name(),
                        change.ticket_id
                    );
                    return true;
                }
                Err(e) => {
                    warn!(
                        "{} notification attempt {} failed for ticket {}: {:#}",
                        channel.name(),
                        attempt,
                        change.ticket_id,
                        e
                    );
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(BACKOFF_STEP * attempt).await;
                    }
                }
            }
        }
        false
    }
}
