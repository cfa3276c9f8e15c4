use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{ArticleUrl, Section};

mod json;
mod sqlite;
pub use json::JsonFileStore;
pub use sqlite::SqliteStore;

/// Last notified item per section key; `None` means never observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservedState(pub BTreeMap<String, Option<String>>);

impl ObservedState {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|url| url.as_deref())
    }

    pub fn set(&mut self, key: &str, url: &ArticleUrl) {
        self.0.insert(key.to_string(), Some(url.to_string()));
    }

    /// Make every configured key present so the written record lists all sections.
    pub fn with_sections(mut self, sections: &[Section]) -> Self {
        for section in sections {
            self.0.entry(section.key.clone()).or_insert(None);
        }
        self
    }
}

/// True when no configured section has a recorded item yet.
pub fn is_bootstrap(state: &ObservedState, sections: &[Section]) -> bool {
    sections.iter().all(|section| state.get(&section.key).is_none())
}

#[async_trait]
pub trait StateStore: Send + Sync {
    /// Never fails: unreadable or unparsable state is treated as empty.
    async fn load(&self) -> ObservedState;

    /// Replaces the whole persisted record.
    async fn commit(&self, state: &ObservedState) -> Result<()>;
}
