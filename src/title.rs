use tracing::debug;

use crate::driver::PageDriver;
use crate::error::Result;
use crate::parsers::non_empty;

pub const PRIMARY_TITLE_FIELD: &str = "og:title";
pub const SOCIAL_TITLE_FIELD: &str = "twitter:title";

/// Best-effort human title for an article page.
pub struct TitleResolver {
    brand_name: String,
}

impl TitleResolver {
    pub fn new(brand_name: &str) -> Self {
        Self {
            brand_name: brand_name.to_string(),
        }
    }

    /// Open Graph title, then Twitter title, then the first `h1`, then the
    /// document title unless it is just the brand. A failing lookup only
    /// moves on to the next candidate.
    pub async fn resolve(&self, driver: &dyn PageDriver) -> Option<String> {
        if let Some(title) = accept("og:title", driver.read_metadata(PRIMARY_TITLE_FIELD).await) {
            return Some(title);
        }
        if let Some(title) = accept("twitter:title", driver.read_metadata(SOCIAL_TITLE_FIELD).await) {
            return Some(title);
        }
        if let Some(title) = accept("h1", driver.read_first_heading_text().await) {
            return Some(title);
        }

        accept("title", driver.read_document_title().await)
            .filter(|title| !title.eq_ignore_ascii_case(self.brand_name.trim()))
    }
}

fn accept(source: &str, candidate: Result<Option<String>>) -> Option<String> {
    match candidate {
        Ok(value) => value.as_deref().and_then(non_empty),
        Err(e) => {
            debug!("Title lookup via {} failed: {}", source, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{FakeArticle, FakeDriver};
    use std::collections::HashMap;

    const URL: &str = "https://7origin.netmarble.com/en/news/1/5";

    fn driver(article: FakeArticle) -> FakeDriver {
        FakeDriver::new().with_article(URL, article).on_article(URL)
    }

    fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn primary_title_beats_alternate() {
        let driver = driver(FakeArticle {
            meta: meta(&[("og:title", "Primary"), ("twitter:title", "Alternate")]),
            heading: Some("Heading".to_string()),
            ..Default::default()
        });
        assert_eq!(TitleResolver::new("Netmarble").resolve(&driver).await.as_deref(), Some("Primary"));
    }

    #[tokio::test]
    async fn blank_metadata_falls_through_to_normalized_heading() {
        let driver = driver(FakeArticle {
            meta: meta(&[("og:title", " \u{a0} ")]),
            heading: Some("\n  Patch\u{a0}notes   1.0.3 ".to_string()),
            title: Some("Something else".to_string()),
        });
        assert_eq!(
            TitleResolver::new("Netmarble").resolve(&driver).await.as_deref(),
            Some("Patch notes 1.0.3")
        );
    }

    #[tokio::test]
    async fn failed_lookup_moves_on() {
        let driver = driver(FakeArticle {
            meta: meta(&[("og:title", "Unreachable"), ("twitter:title", "Alternate")]),
            ..Default::default()
        })
        .failing_read("og:title");
        assert_eq!(TitleResolver::new("Netmarble").resolve(&driver).await.as_deref(), Some("Alternate"));
    }

    #[tokio::test]
    async fn brand_only_document_title_is_skipped() {
        let driver = driver(FakeArticle {
            title: Some("  NETMARBLE ".to_string()),
            ..Default::default()
        });
        assert_eq!(TitleResolver::new("Netmarble").resolve(&driver).await, None);
    }

    #[tokio::test]
    async fn document_title_is_last_resort() {
        let driver = driver(FakeArticle {
            title: Some("Season 2 | Netmarble".to_string()),
            ..Default::default()
        });
        assert_eq!(
            TitleResolver::new("Netmarble").resolve(&driver).await.as_deref(),
            Some("Season 2 | Netmarble")
        );
    }

    #[tokio::test]
    async fn nothing_present_is_absent() {
        let driver = driver(FakeArticle::default());
        assert_eq!(TitleResolver::new("Netmarble").resolve(&driver).await, None);
    }
}
