use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::config::Config;
use crate::driver::PageDriver;
use crate::error::Result;
use crate::models::ArticleUrl;
use crate::parsers::{absolute_url, is_same_site, link_path};

/// Finds the topmost article link on a section view.
pub struct ArticleLocator {
    base_url: String,
    link_filter: String,
    pattern: Regex,
}

impl ArticleLocator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            link_filter: config.link_filter.clone(),
            pattern: config.article_regex()?,
        })
    }

    /// Article links in first-seen order, without repeats, made absolute
    pub async fn candidates(&self, driver: &dyn PageDriver) -> Vec<ArticleUrl> {
        let hrefs = match driver.extract_links(&self.link_filter).await {
            Ok(hrefs) => hrefs,
            Err(e) => {
                debug!("Link extraction failed: {}", e);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        hrefs
            .iter()
            .map(|href| href.trim())
            .filter(|href| is_same_site(&self.base_url, href))
            .filter(|href| self.pattern.is_match(&link_path(href)))
            .map(|href| absolute_url(&self.base_url, href))
            .filter(|url| seen.insert(url.clone()))
            .map(ArticleUrl)
            .collect()
    }

    pub async fn latest(&self, driver: &dyn PageDriver) -> Option<ArticleUrl> {
        self.candidates(driver).await.into_iter().next()
    }
}
