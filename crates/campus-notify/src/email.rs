use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use crate::{NotificationChannel, StatusChange};

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

/// Primary channel: plain-text email to the ticket creator over SMTP.
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => SmtpTransport::starttls_relay(&self.config.host)
                .context("SMTP relay setup failed")?
                .port(self.config.port)
                .credentials(Credentials::new(user.clone(), pass.clone()))
                .build(),
            _ => SmtpTransport::builder_dangerous(&self.config.host)
                .port(self.config.port)
                .build(),
        };
        Ok(transport)
    }

    fn build_message(&self, change: &StatusChange, recipient: &str) -> Result<Message> {
        let subject = format!(
            "[Ticket {}] {} - {}",
            change.ticket_id, change.title, change.new_status
        );

        let message = Message::builder()
            .from(self.config.from.parse().context("invalid from address")?)
            .to(recipient.parse().context("invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(change))?;

        Ok(message)
    }
}

fn render_body(change: &StatusChange) -> String {
    let mut lines = vec![
        format!("Ticket ID: {}", change.ticket_id),
        format!("Başlık: {}", change.title),
        format!("Durum: {} -> {}", change.old_status, change.new_status),
        String::new(),
    ];
    let short = change.short_description();
    if !short.is_empty() {
        lines.push(format!("Kısa Açıklama: {}", short));
    }
    if let Some(resolver) = &change.resolver {
        lines.push(format!("Çözen: {}", resolver));
    }
    lines.push(format!(
        "Zaman: {}",
        chrono::Utc::now().format("%d.%m.%Y %H:%M:%S")
    ));
    lines.join("\n")
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, change: &StatusChange) -> Result<()> {
        let recipient = change
            .recipient
            .as_deref()
            .ok_or_else(|| anyhow!("no email recipient for ticket {}", change.ticket_id))?;

        let message = self.build_message(change, recipient)?;
        let transport = self.build_transport()?;

        // lettre's SmtpTransport is blocking; keep it off the async runtime.
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .context("email send task failed")??;

        Ok(())
    }
}
