//! Page rendering capability.
//!
//! A renderer loads a listing page and hands back a [`DomSnapshot`]: the DOM
//! after dynamic content has settled. Downstream stages only ever select nodes
//! by structural pattern and read their text, attributes and links, so any
//! HTML engine can sit behind the snapshot.

#[cfg(feature = "browser")]
pub mod chromium;
pub mod fixture;
pub mod http;

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;
pub use fixture::FixtureRenderer;
pub use http::HttpRenderer;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::common::error::{Result, ScraperError};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static anchor selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wait for the page's load event before settling (browser backend only)
    pub wait_until_idle: bool,
    pub timeout_ms: u64,
    /// Extra delay after load for client-side frameworks to populate content
    pub settle_ms: u64,
}

impl RenderOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wait_until_idle: true,
            timeout_ms: 30_000,
            settle_ms: 3_000,
        }
    }
}

impl From<&crate::config::RendererConfig> for RenderOptions {
    fn from(config: &crate::config::RendererConfig) -> Self {
        Self {
            wait_until_idle: config.wait_until_idle,
            timeout_ms: config.timeout_ms,
            settle_ms: config.settle_ms,
        }
    }
}

/// Loads a URL and returns the settled DOM.
///
/// Fails with `RenderTimeout` when the page does not finish loading within
/// `timeout_ms` and with `Navigation` on transport failures.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn render(&self, url: &str, options: &RenderOptions) -> Result<DomSnapshot>;
}

/// Elements whose boundaries end a line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements whose text never reaches the reader
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A node picked out of a snapshot by structural selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    /// Rendered text: one line per block, inline runs joined with collapsed whitespace
    pub text: String,
    pub attrs: BTreeMap<String, String>,
    /// Anchor targets inside the node, resolved against the page URL
    pub links: Vec<String>,
    /// Positions, within the same selection, of the selected nodes that contain this one
    pub enclosed_by: Vec<usize>,
}

/// Serialized DOM captured at the end of a render
#[derive(Debug, Clone)]
pub struct DomSnapshot {
    url: String,
    html: String,
}

impl DomSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Selects every element matching any of `selectors`, in document order.
    /// An element matching several selectors is returned once; nesting among
    /// the selected elements is reported through [`DomNode::enclosed_by`].
    pub fn select(&self, selectors: &[String]) -> Result<Vec<DomNode>> {
        if selectors.is_empty() {
            return Ok(Vec::new());
        }
        let group = selectors.join(", ");
        let selector = Selector::parse(&group).map_err(|_| ScraperError::Selector(group.clone()))?;

        let base = Url::parse(&self.url).ok();
        let document = Html::parse_document(&self.html);
        let elements: Vec<ElementRef<'_>> = document.select(&selector).collect();
        let positions: HashMap<_, usize> = elements
            .iter()
            .enumerate()
            .map(|(i, element)| (element.id(), i))
            .collect();

        let nodes = elements
            .iter()
            .map(|element| {
                let enclosed_by = element
                    .ancestors()
                    .filter_map(|ancestor| positions.get(&ancestor.id()).copied())
                    .collect();
                to_dom_node(*element, base.as_ref(), enclosed_by)
            })
            .collect();
        Ok(nodes)
    }
}

fn to_dom_node(element: ElementRef<'_>, base: Option<&Url>, enclosed_by: Vec<usize>) -> DomNode {
    let mut text = TextLines::default();
    text.collect(element);

    let attrs = element
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let links = element
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| resolve_link(base, href))
        .collect();

    DomNode {
        text: text.finish(),
        attrs,
        links,
        enclosed_by,
    }
}

/// Accumulates an element's text the way a browser lays it out: inline
/// runs share a line, block boundaries and `<br>` start a new one.
#[derive(Default)]
struct TextLines {
    lines: Vec<String>,
    current: String,
}

impl TextLines {
    fn collect(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            return;
        }
        let is_block = BLOCK_ELEMENTS.contains(&name);
        if is_block {
            self.break_line();
        }

        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.current.push_str(text);
            } else if let Some(child) = ElementRef::wrap(child) {
                if child.value().name() == "br" {
                    self.break_line();
                } else {
                    self.collect(child);
                }
            }
        }

        if is_block {
            self.break_line();
        }
    }

    fn break_line(&mut self) {
        let line = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

fn resolve_link(base: Option<&Url>, href: &str) -> String {
    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}
