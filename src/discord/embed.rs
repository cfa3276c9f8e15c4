use chrono::Utc;
use serde_json::{json, Value};

use crate::config::Config;
use crate::models::{NotificationEvent, EMOJI_PIN, FALLBACK_DESCRIPTION, NEW_POST_SUFFIX};

/// Fixed look of every notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub username: String,
    pub color: u32,
    pub source: String,
}

impl Branding {
    pub fn from_config(config: &Config) -> Self {
        Self {
            username: config.webhook_username.clone(),
            color: config.color,
            source: format!("Source: {}", config.source_host()),
        }
    }
}

/// Sink-independent shape of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub url: String,
    pub color: u32,
    pub source: String,
}

pub fn build_message(event: &NotificationEvent, branding: &Branding) -> Message {
    let body = match event.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => format!("**{}**", title),
        _ => FALLBACK_DESCRIPTION.to_string(),
    };

    Message {
        title: format!("{} {} — {}", EMOJI_PIN, event.category, NEW_POST_SUFFIX),
        body,
        url: event.url.clone(),
        color: branding.color,
        source: branding.source.clone(),
    }
}

pub fn create_embed(message: &Message) -> Value {
    json!({
        "title": message.title,
        "description": message.body,
        "url": message.url,
        "color": message.color,
        "footer": {
            "text": message.source
        },
        "timestamp": Utc::now().to_rfc3339()
    })
}

pub fn build_payload(message: &Message, username: &str) -> Value {
    json!({
        "username": username,
        "embeds": [create_embed(message)]
    })
}
