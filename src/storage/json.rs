use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::storage::{ObservedState, StateStore};

/// State kept in a pretty-printed JSON object, e.g. `state.json`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> ObservedState {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable state at {}: {}", self.path.display(), e);
                return ObservedState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring unparsable state file {}: {}", self.path.display(), e);
                ObservedState::default()
            }
        }
    }

    async fn commit(&self, state: &ObservedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_string_pretty(state)?;

        // Write next to the target and rename so a crash never leaves half a record
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(body.as_bytes()).await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&tmp, &self.path).await?;

        info!("State written to {}", self.path.display());
        Ok(())
    }
}
