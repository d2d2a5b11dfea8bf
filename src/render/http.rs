use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use super::{DomSnapshot, PageRenderer, RenderOptions};
use crate::common::error::{Result, ScraperError};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Plain HTTP fetch of the listing page.
///
/// No scripts execute here, so pages that build their listings client-side
/// need the `browser` feature. The settle delay is still honored so both
/// backends return on the same schedule.
pub struct HttpRenderer {
    client: Client,
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRenderer {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("user-agent", USER_AGENT)
            .header("accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| ScraperError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        debug!("Listing page response status: {}", status);
        if !status.is_success() {
            return Err(ScraperError::Navigation {
                url: url.to_string(),
                message: format!("request failed with status: {}", status),
            });
        }

        response.text().await.map_err(|e| ScraperError::Navigation {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, options))]
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<DomSnapshot> {
        let html = tokio::time::timeout(options.timeout(), self.fetch(url))
            .await
            .map_err(|_| ScraperError::RenderTimeout {
                url: url.to_string(),
                timeout_ms: options.timeout_ms,
            })??;

        if !options.settle().is_zero() {
            debug!("Settling for {}ms", options.settle_ms);
            tokio::time::sleep(options.settle()).await;
        }

        info!("Fetched {} bytes from {}", html.len(), url);
        Ok(DomSnapshot::new(url, html))
    }
}
