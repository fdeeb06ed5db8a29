use std::time::{Duration, Instant};

use chromiumoxide::{Browser, BrowserConfig};
use chrono::Duration as ChronoDuration;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use trendcore_config::HeadlessBrowserConfig;
use trendcore_extraction::extract_article;
use trendcore_types::{FetchError, FetchMetadata, FetchOutcome, FetchedBody, FetcherKind};

const LATE_CONTENT_SLEEP: Duration = Duration::from_secs(1);

/// One shared browser process. Each `fetch` call opens its own page
/// (browsing context) and closes it on every exit path, success or error.
pub struct HeadlessFetcher {
    browser: Mutex<Browser>,
    config: HeadlessBrowserConfig,
    retention: ChronoDuration,
}

impl HeadlessFetcher {
    pub async fn launch(config: HeadlessBrowserConfig, retention_days: i64) -> anyhow::Result<Self> {
        let mut builder = BrowserConfig::builder()
            .viewport(chromiumoxide::handler::viewport::Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                ..Default::default()
            })
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if let Some(ua) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={ua}"));
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(|e| anyhow::anyhow!(e))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "headless browser handler event error");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            config,
            retention: ChronoDuration::days(retention_days),
        })
    }

    pub fn kind(&self) -> FetcherKind {
        FetcherKind::HeadlessBrowser
    }

    /// Terminates the shared browser and its underlying driver process.
    pub async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!(error = %e, "error closing headless browser");
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        if !self.config.base.enabled {
            return FetchOutcome::Failure {
                error: FetchError::FetcherExhausted,
                message: "headless fetcher disabled".to_string(),
                kind: self.kind(),
            };
        }

        let start = Instant::now();
        match self.do_fetch(url).await {
            Ok(body) => FetchOutcome::Success {
                body,
                kind: self.kind(),
                elapsed_ms: start.elapsed().as_millis() as u64,
            },
            Err((error, message)) => FetchOutcome::Failure {
                error,
                message,
                kind: self.kind(),
            },
        }
    }

    async fn do_fetch(&self, url: &str) -> Result<FetchedBody, (FetchError, String)> {
        let page = {
            let browser = self.browser.lock().await;
            tokio::time::timeout(self.config.base.timeout, browser.new_page("about:blank"))
                .await
                .map_err(|_| (FetchError::Timeout, "timed out creating page".to_string()))?
                .map_err(|e| (FetchError::Network, e.to_string()))?
        };

        let result = self.navigate_and_extract(&page, url).await;

        if let Err(e) = page.close().await {
            warn!(url = %url, error = %e, "error closing headless page");
        }

        result
    }

    async fn navigate_and_extract(
        &self,
        page: &chromiumoxide::Page,
        url: &str,
    ) -> Result<FetchedBody, (FetchError, String)> {
        tokio::time::timeout(self.config.base.timeout, page.goto(url))
            .await
            .map_err(|_| (FetchError::Timeout, "timed out navigating".to_string()))?
            .map_err(|e| (FetchError::Network, e.to_string()))?;

        let wait_result = tokio::time::timeout(
            Duration::from_millis(self.config.wait_timeout_ms),
            page.wait_for_navigation(),
        )
        .await;
        if wait_result.is_err() {
            debug!(url = %url, wait_until = %self.config.wait_until, "navigation wait timed out, continuing anyway");
        }

        sleep(LATE_CONTENT_SLEEP).await;

        let html = page
            .content()
            .await
            .map_err(|e| (FetchError::Network, e.to_string()))?;

        let extracted = extract_article(&html, url)
            .map_err(|e| (FetchError::Network, e.to_string()))?;

        let mut body = FetchedBody::new(
            url,
            extracted.title,
            extracted.body_text,
            FetchMetadata {
                fetcher_kind: Some(self.kind().to_string()),
                format: Some("html".to_string()),
                extra: Default::default(),
            },
            self.retention,
        );
        body.author = extracted.author;
        body.publish_time = extracted.publish_time;
        body.image_urls = extracted.image_urls;
        body.html_excerpt = extracted.html_excerpt;

        Ok(body)
    }
}
