use crate::error::{BrowserError, Result};
use crate::fingerprint::FingerprintConfig;
use crate::page::{HeadlessPage, PageSource};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use futures_util::stream::StreamExt;
use std::time::Duration;

/// Browser automation engine.
///
/// Owns the chromium process and hands out [`HeadlessPage`] tabs configured
/// with a randomized fingerprint.
pub struct BrowserEngine {
    browser: Browser,
    fingerprint: FingerprintConfig,
    navigation_timeout: Duration,
    settle: Duration,
}

impl BrowserEngine {
    /// Launch a browser with the given configuration and a randomized
    /// fingerprint.
    pub async fn launch(config: &magpie_core::BrowserConfig) -> Result<Self> {
        Self::with_fingerprint(config, FingerprintConfig::randomized()).await
    }

    /// Launch a browser with a specific fingerprint.
    pub async fn with_fingerprint(
        config: &magpie_core::BrowserConfig,
        fingerprint: FingerprintConfig,
    ) -> Result<Self> {
        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let chromium_config = builder.build().map_err(BrowserError::Chromium)?;

        let (browser, mut handler) = Browser::launch(chromium_config)
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))?;

        // Drive the devtools event loop for the life of the browser
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        tracing::info!(
            headless = config.headless,
            user_agent = %fingerprint.user_agent,
            "Browser launched"
        );

        Ok(Self {
            browser,
            fingerprint,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle: Duration::from_millis(config.settle_ms),
        })
    }

    /// Shut the browser process down.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))?;
        let _ = self.browser.wait().await;
        tracing::info!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl PageSource for BrowserEngine {
    type Page = HeadlessPage;

    async fn new_page(&self) -> Result<HeadlessPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))?;
        page.set_user_agent(self.fingerprint.user_agent.as_str())
            .await
            .map_err(|e| BrowserError::Chromium(e.to_string()))?;

        Ok(HeadlessPage {
            page,
            navigation_timeout: self.navigation_timeout,
            settle: self.settle,
        })
    }
}
