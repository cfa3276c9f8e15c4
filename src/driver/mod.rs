use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

mod http;
pub use http::HttpPageDriver;

#[cfg(test)]
pub mod fake;

/// How an element is looked up when switching the driven page to a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectStrategy {
    /// A button or tab whose accessible name contains the pattern
    LabelledControl,
    /// A link whose text contains the pattern
    LinkText,
    /// Any element whose visible text equals the pattern
    ExactText,
    /// The innermost element whose visible text contains the pattern
    ContainsText,
}

impl SelectStrategy {
    /// Fallback order used when selecting a section.
    pub const CHAIN: [SelectStrategy; 4] = [
        SelectStrategy::LabelledControl,
        SelectStrategy::LinkText,
        SelectStrategy::ExactText,
        SelectStrategy::ContainsText,
    ];
}

/// The page-driving capability the run is built on.
///
/// Implementations own a single page; callers drive it strictly sequentially.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Activate the first element found by `kind`. `Ok(false)` means nothing matched.
    async fn select_by_strategy(&mut self, kind: SelectStrategy, pattern: &str) -> Result<bool>;

    /// Every `href` on the current view containing `filter`, in document order.
    async fn extract_links(&self, filter: &str) -> Result<Vec<String>>;

    /// `content` of the `<meta>` whose `property` or `name` equals `field`.
    async fn read_metadata(&self, field: &str) -> Result<Option<String>>;

    async fn read_first_heading_text(&self) -> Result<Option<String>>;

    async fn read_document_title(&self) -> Result<Option<String>>;
}
