pub mod embed;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::error::{MonitorError, Result};
use crate::models::NotificationEvent;
pub use embed::{build_message, build_payload, Branding, Message};

/// Outbound delivery of a built notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Anything but a confirmed delivery is an error.
    async fn send(&self, message: &Message) -> Result<()>;
}

pub struct DiscordWebhook {
    client: Client,
    webhook_url: String,
    username: String,
}

impl DiscordWebhook {
    pub fn new(client: Client, webhook_url: &str, username: &str) -> Self {
        Self {
            client,
            webhook_url: webhook_url.to_string(),
            username: username.to_string(),
        }
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn send(&self, message: &Message) -> Result<()> {
        let payload = build_payload(message, &self.username);

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Successfully sent Discord notification for {}", message.url);
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Discord webhook failed with status {}: {}", status, error_text);
            Err(MonitorError::Webhook {
                status: status.as_u16(),
                body: error_text,
            })
        }
    }
}

/// Logs what would have been posted.
pub struct DryRunSink;

#[async_trait]
impl NotificationSink for DryRunSink {
    async fn send(&self, message: &Message) -> Result<()> {
        info!("[dry run] {} | {} | {}", message.title, message.body, message.url);
        Ok(())
    }
}

/// Build the message for one detected change and hand it to the sink.
pub async fn notify(
    sink: &dyn NotificationSink,
    branding: &Branding,
    event: &NotificationEvent,
) -> Result<()> {
    let message = build_message(event, branding);
    sink.send(&message).await
}
