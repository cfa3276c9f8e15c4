use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::{MonitorError, Result};
use crate::models::{Section, DEFAULT_USERNAME, GOLD};

const CONFIG_FILE_ENV: &str = "ORIGIN_WATCH_CONFIG";
const ENV_PREFIX: &str = "ORIGIN_WATCH";
const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub landing_path: String,
    /// Top-menu link activated after loading the landing page.
    pub entry_link: Option<String>,
    pub sections: Vec<Section>,
    pub article_url_pattern: String,
    pub link_filter: String,
    pub call_timeout_secs: u64,
    pub board_settle_ms: u64,
    pub tab_settle_ms: u64,
    pub article_settle_ms: u64,
    pub brand_name: String,
    pub state_backend: StateBackend,
    pub state_path: String,
    pub webhook_url: Option<String>,
    pub webhook_username: String,
    pub color: u32,
    pub user_agent: String,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://7origin.netmarble.com".to_string(),
            landing_path: "/en/".to_string(),
            entry_link: Some("News".to_string()),
            sections: vec![
                Section::new("news", "News", "News"),
                Section::new("notices", "Notices", "Notices"),
                Section::new("dev", "Developer notes", "Developer notes"),
            ],
            article_url_pattern: r"^/en/news/\d+/\d+$".to_string(),
            link_filter: "/news/".to_string(),
            call_timeout_secs: 60,
            board_settle_ms: 2500,
            tab_settle_ms: 2000,
            article_settle_ms: 1200,
            brand_name: "Netmarble".to_string(),
            state_backend: StateBackend::Json,
            state_path: "state.json".to_string(),
            webhook_url: None,
            webhook_username: DEFAULT_USERNAME.to_string(),
            color: GOLD,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            dry_run: false,
        }
    }
}

impl Config {
    /// Layers defaults, an optional config file, `ORIGIN_WATCH_*` variables and
    /// the `DISCORD_WEBHOOK` secret, then validates the result.
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| "origin-watch".to_string());

        let loader = config::Config::builder()
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        let mut config: Config = loader
            .try_deserialize()
            .map_err(|e| MonitorError::Config(e.to_string()))?;

        if let Ok(webhook) = std::env::var(WEBHOOK_ENV) {
            config.webhook_url = Some(webhook);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .and_then(|loader| loader.try_deserialize())
            .map_err(|e| MonitorError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let webhook_missing = self
            .webhook_url
            .as_deref()
            .map_or(true, |url| url.trim().is_empty());
        if webhook_missing && !self.dry_run {
            return Err(MonitorError::Config(format!("Missing {} secret", WEBHOOK_ENV)));
        }

        if self.sections.is_empty() {
            return Err(MonitorError::Config("No sections configured".to_string()));
        }

        let mut keys = HashSet::new();
        for section in &self.sections {
            if section.key.trim().is_empty() {
                return Err(MonitorError::Config(format!(
                    "Section '{}' has an empty key",
                    section.label
                )));
            }
            if !keys.insert(section.key.as_str()) {
                return Err(MonitorError::Config(format!(
                    "Duplicate section key '{}'",
                    section.key
                )));
            }
        }

        self.article_regex()?;
        url::Url::parse(&self.base_url)
            .map_err(|e| MonitorError::Config(format!("Invalid base_url {}: {}", self.base_url, e)))?;

        Ok(())
    }

    pub fn article_regex(&self) -> Result<Regex> {
        Regex::new(&self.article_url_pattern).map_err(|e| {
            MonitorError::Config(format!(
                "Invalid article_url_pattern {}: {}",
                self.article_url_pattern, e
            ))
        })
    }

    pub fn landing_url(&self) -> String {
        crate::parsers::absolute_url(&self.base_url, &self.landing_path)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Host shown in the embed footer.
    pub fn source_host(&self) -> String {
        url::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_origin_board() {
        let config = Config::default();
        let keys: Vec<_> = config.sections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["news", "notices", "dev"]);
        assert_eq!(config.landing_url(), "https://7origin.netmarble.com/en/");
        assert_eq!(config.source_host(), "7origin.netmarble.com");
        assert_eq!(config.call_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn missing_webhook_is_a_config_error() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, MonitorError::Config(msg) if msg.contains("DISCORD_WEBHOOK")));
    }

    #[test]
    fn dry_run_does_not_need_a_webhook() {
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_overrides_sections_and_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            webhook_url = "https://discord.test/hook"
            call_timeout_secs = 15

            [[sections]]
            key = "news"
            label = "News"
            selector = "News"

            [[sections]]
            key = "events"
            label = "Events"
            selector = "Event"
            "#,
        )
        .unwrap();

        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections[1], Section::new("events", "Events", "Event"));
        assert_eq!(config.call_timeout_secs, 15);
        assert_eq!(config.base_url, "https://7origin.netmarble.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let config = Config {
            webhook_url: Some("https://discord.test/hook".to_string()),
            sections: vec![
                Section::new("news", "News", "News"),
                Section::new("news", "Notices", "Notices"),
            ],
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, MonitorError::Config(msg) if msg.contains("Duplicate")));
    }

    #[test]
    fn bad_article_pattern_is_rejected() {
        let config = Config {
            webhook_url: Some("https://discord.test/hook".to_string()),
            article_url_pattern: "(".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
