//! Status-change notifications over configurable channels.
//!
//! Channels implement [`NotificationChannel`] and are composed by the
//! [`dispatcher::Notifier`], which tries them in priority order with
//! bounded retry. Delivery is fire-and-forget: exhausting every channel is
//! logged and never surfaced to the ticket mutation that triggered it.

pub mod dispatcher;
pub mod email;
pub mod sms;
pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use campus_types::models::TicketStatus;

/// One ticket status transition, with enough context to render any channel
/// payload.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub ticket_id: i64,
    pub old_status: TicketStatus,
    pub new_status: TicketStatus,
    pub title: String,
    pub description: String,
    /// Email of the user who performed the transition.
    pub resolver: Option<String>,
    /// Email of the ticket creator.
    pub recipient: Option<String>,
}

impl StatusChange {
    /// Description capped at 200 characters for channel payloads.
    pub fn short_description(&self) -> String {
        let trimmed = self.description.trim();
        match trimmed.char_indices().nth(197) {
            Some((idx, _)) => format!("{}...", &trimmed[..idx]),
            None => trimmed.to_string(),
        }
    }
}

/// A delivery capability. Implementations must not retry internally; the
/// dispatcher owns the retry policy.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, change: &StatusChange) -> Result<()>;
}
