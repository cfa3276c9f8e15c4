use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::driver::{PageDriver, SelectStrategy};
use crate::error::{MonitorError, Result};

pub const BOARD_URL: &str = "https://7origin.netmarble.com/en/";

#[derive(Debug, Clone, Default)]
pub struct FakeArticle {
    pub meta: HashMap<String, String>,
    pub heading: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeTab {
    /// Strategies that find this tab; the rest report no match
    reachable_by: Vec<SelectStrategy>,
    links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Blank,
    Board(Option<String>),
    Article(String),
}

/// Scripted board with tabs and article pages.
pub struct FakeDriver {
    tabs: HashMap<String, FakeTab>,
    articles: HashMap<String, FakeArticle>,
    failing_urls: HashSet<String>,
    /// Loads allowed before the url starts failing
    failing_after: HashMap<String, usize>,
    failing_strategies: HashSet<SelectStrategy>,
    failing_reads: HashSet<String>,
    view: View,
    pub navigations: Vec<String>,
    pub selections: Vec<(SelectStrategy, String)>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self {
            tabs: HashMap::new(),
            articles: HashMap::new(),
            failing_urls: HashSet::new(),
            failing_after: HashMap::new(),
            failing_strategies: HashSet::new(),
            failing_reads: HashSet::new(),
            view: View::Blank,
            navigations: Vec::new(),
            selections: Vec::new(),
        }
    }

    pub fn with_tab(self, name: &str, links: &[&str]) -> Self {
        self.with_tab_reachable_by(name, &SelectStrategy::CHAIN, links)
    }

    pub fn with_tab_reachable_by(
        mut self,
        name: &str,
        strategies: &[SelectStrategy],
        links: &[&str],
    ) -> Self {
        self.tabs.insert(
            name.to_lowercase(),
            FakeTab {
                reachable_by: strategies.to_vec(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_article(mut self, url: &str, article: FakeArticle) -> Self {
        self.articles.insert(url.to_string(), article);
        self
    }

    pub fn failing_navigation_to(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn failing_navigation_after(mut self, url: &str, successes: usize) -> Self {
        self.failing_after.insert(url.to_string(), successes);
        self
    }

    pub fn failing_strategy(mut self, strategy: SelectStrategy) -> Self {
        self.failing_strategies.insert(strategy);
        self
    }

    /// Make `read_metadata(field)` (or "heading"/"title") return an error
    pub fn failing_read(mut self, what: &str) -> Self {
        self.failing_reads.insert(what.to_string());
        self
    }

    pub fn on_board(mut self) -> Self {
        self.view = View::Board(None);
        self
    }

    pub fn on_article(mut self, url: &str) -> Self {
        self.view = View::Article(url.to_string());
        self
    }

    fn article(&self) -> Option<&FakeArticle> {
        match &self.view {
            View::Article(url) => self.articles.get(url),
            _ => None,
        }
    }

    fn check_read(&self, what: &str) -> Result<()> {
        if self.failing_reads.contains(what) {
            return Err(MonitorError::Selector(format!("{} unavailable", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let earlier = self.navigations.iter().filter(|seen| seen.as_str() == url).count();
        self.navigations.push(url.to_string());
        let exhausted = self
            .failing_after
            .get(url)
            .map_or(false, |successes| earlier >= *successes);
        if self.failing_urls.contains(url) || exhausted {
            return Err(MonitorError::Timeout {
                url: url.to_string(),
                after: timeout,
            });
        }
        self.view = if url == BOARD_URL {
            View::Board(None)
        } else {
            View::Article(url.to_string())
        };
        Ok(())
    }

    async fn select_by_strategy(&mut self, kind: SelectStrategy, pattern: &str) -> Result<bool> {
        self.selections.push((kind, pattern.to_string()));
        if self.failing_strategies.contains(&kind) {
            return Err(MonitorError::Selector(format!("{:?} exploded", kind)));
        }
        if !matches!(self.view, View::Board(_)) {
            return Ok(false);
        }

        let name = pattern.to_lowercase();
        match self.tabs.get(&name) {
            Some(tab) if tab.reachable_by.contains(&kind) => {
                self.view = View::Board(Some(name));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn extract_links(&self, filter: &str) -> Result<Vec<String>> {
        match &self.view {
            View::Board(Some(tab)) => Ok(self.tabs[tab]
                .links
                .iter()
                .filter(|href| href.contains(filter))
                .cloned()
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn read_metadata(&self, field: &str) -> Result<Option<String>> {
        self.check_read(field)?;
        Ok(self.article().and_then(|a| a.meta.get(field).cloned()))
    }

    async fn read_first_heading_text(&self) -> Result<Option<String>> {
        self.check_read("heading")?;
        Ok(self.article().and_then(|a| a.heading.clone()))
    }

    async fn read_document_title(&self) -> Result<Option<String>> {
        self.check_read("title")?;
        Ok(self.article().and_then(|a| a.title.clone()))
    }
}
