//! Web search returning a plain list of result URLs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

use super::http_client;

const DUCKDUCKGO_HTML: &str = "https://html.duckduckgo.com/html/";

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*class="[^"]*result__a[^"]*"[^>]*href="([^"]+)""#).expect("valid regex")
});

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns up to `max_results` result URLs for `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Default, Clone)]
pub struct DuckDuckGoSearch;

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let body = http_client()
            .get(DUCKDUCKGO_HTML)
            .query(&[("q", query)])
            .send()
            .await
            .context("search request failed")?
            .error_for_status()?
            .text()
            .await?;
        Ok(extract_result_links(&body, max_results))
    }
}

/// Pulls result URLs out of a DuckDuckGo HTML results page, unwrapping
/// `/l/?uddg=<target>` redirects. Duplicates are dropped, order kept.
pub fn extract_result_links(body: &str, max_results: usize) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for caps in RESULT_LINK.captures_iter(body) {
        if links.len() >= max_results {
            break;
        }
        let Some(url) = resolve_result_href(&caps[1].replace("&amp;", "&")) else {
            continue;
        };
        if !links.contains(&url) {
            links.push(url);
        }
    }
    links
}

fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;
    let target = url
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());
    match target {
        Some(target) => Some(target),
        None if url.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) => None,
        None => Some(absolute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"
        <div class="result"><a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust</a></div>
        <div class="result"><a class="result__a" href="https://doc.rust-lang.org/book/">Book</a></div>
        <div class="result"><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=def">Rust again</a></div>
        <div class="result"><a class="result__a" href="/y.js?ad_provider=x">Ad</a></div>
        <div class="result"><a class="result__snippet" href="https://ignored.example/">Snippet</a></div>
        <div class="result"><a class="result__a" href="https://crates.io/">Crates</a></div>
    "#;

    #[test]
    fn test_extracts_and_unwraps_redirects() {
        let links = extract_result_links(RESULTS, 10);
        assert_eq!(
            links,
            vec![
                "https://www.rust-lang.org/",
                "https://doc.rust-lang.org/book/",
                "https://crates.io/",
            ]
        );
    }

    #[test]
    fn test_respects_max_results() {
        assert_eq!(extract_result_links(RESULTS, 1), vec!["https://www.rust-lang.org/"]);
        assert!(extract_result_links(RESULTS, 0).is_empty());
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_result_links("<html></html>", 5).is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_search() {
        let links = DuckDuckGoSearch.search("rust programming language", 3).await.unwrap();
        assert!(!links.is_empty());
        assert!(links.len() <= 3);
    }
}
