use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::{JsonFileStore, ObservedState, StateStore};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    pub async fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS section_state (
                section_key TEXT PRIMARY KEY NOT NULL,
                url TEXT,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }

    /// Seed an empty table from a JSON state file left by earlier runs.
    pub async fn import_from_json(&self, json_path: &str) -> Result<()> {
        if !Path::new(json_path).exists() {
            info!("No existing JSON state to import");
            return Ok(());
        }

        let rows: i64 = {
            let conn = self.conn.lock().await;
            conn.query_row("SELECT COUNT(*) FROM section_state", [], |row| row.get(0))?
        };
        if rows > 0 {
            return Ok(());
        }

        let state = JsonFileStore::new(json_path).load().await;
        self.commit(&state).await?;
        info!("Imported state from {}", json_path);
        Ok(())
    }

    async fn read_all(&self) -> Result<ObservedState> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT section_key, url FROM section_state")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut state = ObservedState::default();
        for row in rows {
            let (key, url) = row?;
            state.0.insert(key, url);
        }
        Ok(state)
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load(&self) -> ObservedState {
        match self.read_all().await {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring unreadable section_state table: {}", e);
                ObservedState::default()
            }
        }
    }

    async fn commit(&self, state: &ObservedState) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM section_state", [])?;
        for (key, url) in &state.0 {
            tx.execute(
                "INSERT INTO section_state (section_key, url) VALUES (?1, ?2)",
                params![key, url],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
