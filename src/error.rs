use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out after {after:?} loading {url}")]
    Timeout { url: String, after: Duration },

    #[error("Navigation to {url} failed with status {status}")]
    Navigation { url: String, status: u16 },

    #[error("Discord webhook failed: {status} {body}")]
    Webhook { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
