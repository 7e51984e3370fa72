//! Dynamic media discovery (§4.7, optional, `dynamic-media` feature):
//! drive a headless browser to let JS-rendered pages settle, then scrape
//! media attributes a plain HTTP fetch would never see. Ported from
//! `rust_scraper/cdp.rs`'s launch/navigate pattern, trimmed to the
//! narrow surface C7 actually needs — no stealth scripting, no scroll
//! simulation, since this path exists for media discovery, not for
//! evading anti-bot defenses.

use anyhow::{anyhow, Context, Result};
use chromiumoxide::Browser;
use futures::StreamExt;
use std::time::Duration;

const MEDIA_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-original", "data-url"];

pub struct HeadlessBrowser {
    browser: Browser,
}

impl HeadlessBrowser {
    pub async fn launch() -> Result<Self> {
        let config = chromiumoxide::BrowserConfig::builder()
            .build()
            .map_err(|e| anyhow!("failed to build headless browser config: {e}"))?;
        let (browser, mut handler) = Browser::launch(config).await.context("failed to launch headless browser")?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self { browser })
    }

    /// Load `url`, wait for it to settle, and return every media URL
    /// found on `img`/`video`/`audio` elements (any of the lazy-load
    /// attribute variants listed in `MEDIA_ATTRS`). Bounded by
    /// `timeout` and never propagates a failure past `Ok(vec![])` —
    /// the caller treats an empty result the same as "nothing found".
    pub async fn discover_media(&self, url: &str, timeout: Duration) -> Vec<String> {
        match tokio::time::timeout(timeout, self.discover_media_inner(url)).await {
            Ok(Ok(urls)) => urls,
            _ => Vec::new(),
        }
    }

    async fn discover_media_inner(&self, url: &str) -> Result<Vec<String>> {
        let page = self.browser.new_page("about:blank").await?;
        page.goto(url).await?;
        page.wait_for_navigation().await?;

        let mut found = Vec::new();
        for selector in ["img", "video", "video source", "audio", "audio source"] {
            let elements = page.find_elements(selector).await.unwrap_or_default();
            for element in elements {
                for attr in MEDIA_ATTRS {
                    if let Ok(Some(value)) = element.attribute(attr).await {
                        if !value.is_empty() {
                            found.push(value);
                        }
                    }
                }
            }
        }
        Ok(found)
    }
}
