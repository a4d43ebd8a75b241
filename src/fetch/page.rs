// src/fetch/page.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

/// Knobs for one page render: `headless` is carried for browser-backed
/// renderers, `wait` is the post-load settle delay, `timeout` bounds the
/// page fetch itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub headless: bool,
    pub wait: Duration,
    pub timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            headless: true,
            wait: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Capability boundary for the page scraper: render a URL to HTML.
/// The processing core never touches this, so it stays testable with
/// synthetic grids.
#[async_trait]
pub trait PageRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<String>;
}

/// Plain-HTTP renderer. Fetches once to warm the session, sleeps out the
/// settle delay, then takes the snapshot actually used. Ignores `headless`
/// since no browser is involved.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64)")
            .cookie_store(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    async fn get(&self, url: &Url, timeout: Duration) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()?;
        resp.text()
            .await
            .with_context(|| format!("reading body from {}", url))
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<String> {
        let first = self.get(url, opts.timeout).await?;
        if opts.wait.is_zero() {
            return Ok(first);
        }
        debug!(wait = ?opts.wait, "settling before final snapshot");
        sleep(opts.wait).await;
        self.get(url, opts.timeout).await
    }
}
