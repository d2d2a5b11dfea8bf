use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use super::{DomSnapshot, PageRenderer, RenderOptions};
use crate::common::error::{Result, ScraperError};

/// Renders the listing page in a headless Chromium session.
///
/// Each `render` launches its own browser and closes it before returning,
/// whether or not the capture succeeded. With `wait_until_idle` the page's
/// load event is awaited after navigation; requests still in flight after
/// that are covered by the settle delay, not by network-idle detection.
#[derive(Default)]
pub struct ChromiumRenderer;

impl ChromiumRenderer {
    pub fn new() -> Self {
        Self
    }

    async fn capture(browser: &Browser, url: &str, options: &RenderOptions) -> Result<String> {
        let nav_err = |e: chromiumoxide::error::CdpError| ScraperError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let page = browser.new_page("about:blank").await.map_err(nav_err)?;

        let load = async {
            page.goto(url).await?;
            if options.wait_until_idle {
                // Resolves on the load event
                page.wait_for_navigation().await?;
            }
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        tokio::time::timeout(options.timeout(), load)
            .await
            .map_err(|_| ScraperError::RenderTimeout {
                url: url.to_string(),
                timeout_ms: options.timeout_ms,
            })?
            .map_err(nav_err)?;

        debug!("Waiting {}ms for client-side content", options.settle_ms);
        tokio::time::sleep(options.settle()).await;

        let html = page.content().await.map_err(nav_err)?;
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }
        Ok(html)
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        "chromium"
    }

    #[instrument(skip(self, options))]
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<DomSnapshot> {
        let config = BrowserConfig::builder()
            .request_timeout(options.timeout())
            .build()
            .map_err(|message| ScraperError::Navigation {
                url: url.to_string(),
                message,
            })?;

        let (mut browser, mut handler) =
            Browser::launch(config)
                .await
                .map_err(|e| ScraperError::Navigation {
                    url: url.to_string(),
                    message: format!("failed to launch browser: {}", e),
                })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let outcome = Self::capture(&browser, url, options).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        handler_task.abort();

        let html = outcome?;
        info!("Rendered {} bytes from {}", html.len(), url);
        Ok(DomSnapshot::new(url, html))
    }
}
