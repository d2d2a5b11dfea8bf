use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use super::{DomSnapshot, PageRenderer, RenderOptions};
use crate::common::error::Result;

/// Serves a fixed HTML document regardless of the requested URL
pub struct FixtureRenderer {
    html: String,
}

impl FixtureRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::new(html))
    }
}

#[async_trait]
impl PageRenderer for FixtureRenderer {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn render(&self, url: &str, _options: &RenderOptions) -> Result<DomSnapshot> {
        debug!("Serving {} byte fixture for {}", self.html.len(), url);
        Ok(DomSnapshot::new(url, self.html.clone()))
    }
}
