//! The navigable-page abstraction the scrape engine fetches through.
//!
//! A page is "fetched" once navigation has completed and the page has been
//! given a settle interval for late script-driven content; only then is the
//! rendered document read back.

use crate::error::{BrowserError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;

/// A browser tab that can load URLs and hand back rendered content.
#[async_trait]
pub trait NavigablePage: Send + Sync {
    /// Navigate to `url`, wait for the page to quiesce, and return the
    /// rendered document.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Close the tab.
    async fn close(self) -> Result<()>;
}

/// A factory for per-phase page resources.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// The page type this source produces.
    type Page: NavigablePage;

    /// Open a fresh page.
    async fn new_page(&self) -> Result<Self::Page>;
}

/// A chromium tab driven through the devtools protocol.
pub struct HeadlessPage {
    pub(crate) page: chromiumoxide::Page,
    pub(crate) navigation_timeout: Duration,
    pub(crate) settle: Duration,
}

#[async_trait]
impl NavigablePage for HeadlessPage {
    async fn fetch(&self, url: &str) -> Result<String> {
        let navigate = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| BrowserError::Navigation(format!("{url}: {e}")))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| BrowserError::Navigation(format!("{url}: {e}")))?;
            Ok::<(), BrowserError>(())
        };

        timeout(self.navigation_timeout, navigate)
            .await
            .map_err(|_| BrowserError::Timeout(url.to_string()))??;

        // Devtools has no single network-idle signal; give late XHR-driven
        // content a settle interval before reading the DOM.
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Content(format!("{url}: {e}")))
    }

    async fn close(self) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))
    }
}
