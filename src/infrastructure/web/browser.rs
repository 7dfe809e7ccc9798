//! Browser session behind the `browse_web` tool.
//!
//! [`HttpBrowser`] fetches pages over plain HTTP and remembers the current
//! page. It has no script engine, so `execute_js` and `scroll` fail.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::Serialize;

use super::html::{self, PageSummary};
use super::http_client;

#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and makes it the current page.
    async fn navigate(&mut self, url: &str) -> Result<()>;
    /// Raw HTML of the current page.
    async fn page_html(&mut self) -> Result<String>;
    async fn execute_js(&mut self, script: &str) -> Result<String>;
    async fn scroll(&mut self, pixels: i64) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct HttpBrowser {
    /// HTML of the last page navigated to.
    current: Option<String>,
}

impl HttpBrowser {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrowserSession for HttpBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let (_, html) = get_page(url).await?;
        self.current = Some(html);
        Ok(())
    }

    async fn page_html(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| anyhow!("No page loaded. Use 'navigate' first"))
    }

    async fn execute_js(&mut self, _script: &str) -> Result<String> {
        bail!("JavaScript execution is not supported by this browser backend")
    }

    async fn scroll(&mut self, _pixels: i64) -> Result<()> {
        bail!("Scrolling is not supported by this browser backend")
    }
}

/// Result of the stateless `fetch` action.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    pub description: String,
    pub text: String,
}

impl FetchedPage {
    pub fn from_html(url: String, body: &str) -> Self {
        let PageSummary {
            title,
            description,
            text,
            ..
        } = html::summarize(body);
        Self {
            url,
            title,
            description,
            text,
        }
    }
}

/// Fetches `url` without touching any browser session.
pub async fn fetch_webpage(url: &str) -> Result<FetchedPage> {
    let (final_url, body) = get_page(url).await?;
    Ok(FetchedPage::from_html(final_url, &body))
}

async fn get_page(url: &str) -> Result<(String, String)> {
    let response = http_client()
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?;
    let final_url = response.url().to_string();
    let body = response.text().await?;
    Ok((final_url, body))
}
