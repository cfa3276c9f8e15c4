use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod discord;
mod driver;
mod error;
mod locator;
mod models;
mod navigator;
mod parsers;
mod runner;
mod storage;
mod title;
mod utils;

use crate::config::{Config, StateBackend};
use crate::discord::{DiscordWebhook, DryRunSink, NotificationSink};
use crate::driver::HttpPageDriver;
use crate::runner::RunCoordinator;
use crate::storage::{JsonFileStore, SqliteStore, StateStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("origin_watch=info".parse()?),
        )
        .init();

    info!("Starting Origin Watch");

    // Load configuration
    let config = Config::load().context("Invalid configuration")?;

    // Initialize storage
    let store: Arc<dyn StateStore> = match config.state_backend {
        StateBackend::Json => Arc::new(JsonFileStore::new(&config.state_path)),
        StateBackend::Sqlite => {
            let db_path = format!("{}.db", config.state_path.trim_end_matches(".json"));
            let sqlite = SqliteStore::new(&db_path)
                .await
                .context("Failed to open state database")?;
            sqlite.migrate().await?;
            sqlite.import_from_json(&config.state_path).await?;
            Arc::new(sqlite)
        }
    };

    // One client for the board and the webhook
    let client = utils::http::create_client(&config.user_agent, config.call_timeout())?;

    let sink: Arc<dyn NotificationSink> = match config.webhook_url.as_deref() {
        Some(webhook) if !config.dry_run => Arc::new(DiscordWebhook::new(
            client.clone(),
            webhook,
            &config.webhook_username,
        )),
        _ => Arc::new(DryRunSink),
    };

    let driver = HttpPageDriver::new(client, config.call_timeout());
    let mut coordinator = RunCoordinator::new(&config, Box::new(driver), sink, store)?;

    match coordinator.run().await {
        Ok(report) => {
            info!(
                "Run completed: {} section(s), {} notification(s), state {}",
                report.outcomes.len(),
                report.notified,
                if report.committed { "written" } else { "untouched" }
            );
            Ok(())
        }
        Err(e) => {
            error!("Run aborted, state left untouched: {}", e);
            Err(e).context("Run aborted")
        }
    }
}
