use serde::{Deserialize, Serialize};
use std::fmt;

// NewType pattern for type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleUrl(pub String);

impl fmt::Display for ArticleUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ArticleUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Most recent item found in a section. The title is only fetched once a
/// notification is about to go out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub url: ArticleUrl,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub category: String,
    pub title: Option<String>,
    pub url: String,
}

impl NotificationEvent {
    pub fn from_article(category: &str, article: &ArticleRef) -> Self {
        Self {
            category: category.to_string(),
            title: article.title.clone(),
            url: article.url.to_string(),
        }
    }
}
