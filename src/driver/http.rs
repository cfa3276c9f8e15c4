use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::driver::{PageDriver, SelectStrategy};
use crate::error::{MonitorError, Result};
use crate::parsers::{absolute_url, clean_text, non_empty};
use crate::utils::http::fetch_page;

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("Invalid body selector"));
static CONTROLS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"button, [role="button"], [role="tab"]"#).expect("Invalid control selector")
});
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("Invalid link selector"));
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("Invalid heading selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("Invalid title selector"));

const INVISIBLE: [&str; 5] = ["script", "style", "noscript", "template", "head"];

struct LoadedPage {
    url: String,
    html: String,
    /// Id of the panel the view is narrowed to after activating a tab
    scope: Option<String>,
}

/// What activating a matched element does to the static page.
#[derive(Debug, PartialEq, Eq)]
enum Activation {
    Scope(String),
    Navigate(String),
    Stay,
}

/// Drives server-rendered pages: GET with a timeout, then answers queries
/// against the parsed document. Tabs are followed through their panel
/// reference or their `href`.
pub struct HttpPageDriver {
    client: Client,
    call_timeout: Duration,
    page: Option<LoadedPage>,
}

impl HttpPageDriver {
    pub fn new(client: Client, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
            page: None,
        }
    }

    #[cfg(test)]
    pub fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|page| page.url.as_str())
    }
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        debug!("Loading {}", url);
        let fetched = fetch_page(&self.client, url, timeout).await?;
        self.page = Some(LoadedPage {
            url: fetched.url,
            html: fetched.html,
            scope: None,
        });
        Ok(())
    }

    async fn select_by_strategy(&mut self, kind: SelectStrategy, pattern: &str) -> Result<bool> {
        let Some(page) = self.page.as_ref() else {
            return Ok(false);
        };

        // Parsed documents are not Send, so resolve everything before awaiting
        let activation = {
            let document = Html::parse_document(&page.html);
            match find_target(&document, kind, pattern)? {
                Some(element) => activation_for(&document, element),
                None => return Ok(false),
            }
        };

        debug!("{:?} '{}' -> {:?}", kind, pattern, activation);
        match activation {
            Activation::Scope(id) => {
                if let Some(page) = self.page.as_mut() {
                    page.scope = Some(id);
                }
            }
            Activation::Navigate(href) => {
                let target = absolute_url(&page.url, &href);
                let timeout = self.call_timeout;
                self.navigate(&target, timeout).await?;
            }
            Activation::Stay => {}
        }
        Ok(true)
    }

    async fn extract_links(&self, filter: &str) -> Result<Vec<String>> {
        let Some(page) = self.page.as_ref() else {
            return Ok(Vec::new());
        };
        let document = Html::parse_document(&page.html);
        let view = view_root(&document, page.scope.as_deref())?;

        Ok(view
            .select(&LINKS)
            .filter_map(|link| link.value().attr("href"))
            .filter(|href| href.contains(filter))
            .map(str::to_string)
            .collect())
    }

    async fn read_metadata(&self, field: &str) -> Result<Option<String>> {
        let Some(page) = self.page.as_ref() else {
            return Ok(None);
        };
        let selector = parse_selector(&format!(
            r#"meta[property="{0}"], meta[name="{0}"]"#,
            field
        ))?;
        let document = Html::parse_document(&page.html);

        Ok(document
            .select(&selector)
            .filter_map(|meta| meta.value().attr("content"))
            .find_map(non_empty))
    }

    async fn read_first_heading_text(&self) -> Result<Option<String>> {
        let Some(page) = self.page.as_ref() else {
            return Ok(None);
        };
        let document = Html::parse_document(&page.html);
        let view = view_root(&document, page.scope.as_deref())?;

        Ok(view
            .select(&HEADING)
            .map(visible_text)
            .find(|text| !text.is_empty()))
    }

    async fn read_document_title(&self) -> Result<Option<String>> {
        let Some(page) = self.page.as_ref() else {
            return Ok(None);
        };
        let document = Html::parse_document(&page.html);

        Ok(document
            .select(&TITLE)
            .next()
            .map(|title| title.text().collect::<String>()))
    }
}

fn parse_selector(source: &str) -> Result<Selector> {
    Selector::parse(source).map_err(|e| MonitorError::Selector(format!("{}: {:?}", source, e)))
}

fn body(document: &Html) -> ElementRef<'_> {
    document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element())
}

fn view_root<'a>(document: &'a Html, scope: Option<&str>) -> Result<ElementRef<'a>> {
    if let Some(id) = scope {
        let selector = parse_selector(&format!(r#"[id="{}"]"#, id))?;
        if let Some(panel) = document.select(&selector).next() {
            return Ok(panel);
        }
    }
    Ok(body(document))
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    clean_text(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    if INVISIBLE.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            collect_text(child, out);
        }
    }
}

fn accessible_name(element: ElementRef<'_>) -> String {
    element
        .value()
        .attr("aria-label")
        .and_then(non_empty)
        .unwrap_or_else(|| visible_text(element))
}

/// Case-insensitive text test for one strategy
fn matches(kind: SelectStrategy, text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = clean_text(pattern).to_lowercase();
    if pattern.is_empty() {
        return false;
    }
    match kind {
        SelectStrategy::ExactText => text == pattern,
        _ => text.contains(&pattern),
    }
}

fn find_target<'a>(
    document: &'a Html,
    kind: SelectStrategy,
    pattern: &str,
) -> Result<Option<ElementRef<'a>>> {
    // Tabs sit outside the panel a previous selection narrowed to
    let root = body(document);

    let found = match kind {
        SelectStrategy::LabelledControl => root
            .select(&CONTROLS)
            .find(|el| matches(kind, &accessible_name(*el), pattern)),
        SelectStrategy::LinkText => root
            .select(&LINKS)
            .find(|el| matches(kind, &accessible_name(*el), pattern)),
        SelectStrategy::ExactText | SelectStrategy::ContainsText => root
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| matches(kind, &visible_text(*el), pattern))
            .map(|el| innermost(el, kind, pattern)),
    };
    Ok(found)
}

/// Walk down while a child element still carries the matching text.
fn innermost<'a>(mut element: ElementRef<'a>, kind: SelectStrategy, pattern: &str) -> ElementRef<'a> {
    while let Some(child) = element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| matches(kind, &visible_text(*child), pattern))
    {
        element = child;
    }
    element
}

fn activation_for(document: &Html, element: ElementRef<'_>) -> Activation {
    let chain = std::iter::successors(Some(element), |el| el.parent().and_then(ElementRef::wrap));

    for el in chain {
        let attrs = el.value();

        let panel = attrs
            .attr("aria-controls")
            .map(str::to_string)
            .or_else(|| attrs.attr("data-target").and_then(|t| t.strip_prefix('#')).map(str::to_string))
            .or_else(|| {
                attrs
                    .attr("href")
                    .and_then(|h| h.strip_prefix('#'))
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            });
        if let Some(id) = panel {
            if panel_exists(document, &id) {
                return Activation::Scope(id);
            }
        }

        let href = attrs.attr("href").or_else(|| attrs.attr("data-href"));
        if let Some(href) = href.map(str::trim) {
            if !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:") {
                return Activation::Navigate(href.to_string());
            }
        }
    }
    Activation::Stay
}

fn panel_exists(document: &Html, id: &str) -> bool {
    parse_selector(&format!(r#"[id="{}"]"#, id))
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false)
}
