//! Lightweight HTML extraction: title, meta description, visible text and
//! link/image counts. Regex based; good enough for summarizing pages for an agent.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Visible text is truncated to this many characters (plus `...`).
pub const MAX_TEXT_CHARS: usize = 3000;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*name\s*=\s*["']description["'][^>]*content\s*=\s*["']([^"']*)["']"#)
        .expect("valid regex")
});
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<head\b.*?</head>|<!--.*?-->")
        .expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*href\s*=").expect("valid regex"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b").expect("valid regex"));

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageSummary {
    pub title: String,
    pub description: String,
    pub text: String,
    pub links_count: usize,
    pub images_count: usize,
}

pub fn summarize(html: &str) -> PageSummary {
    PageSummary {
        title: title(html),
        description: description(html),
        text: truncate(&visible_text(html), MAX_TEXT_CHARS),
        links_count: LINK.find_iter(html).count(),
        images_count: IMAGE.find_iter(html).count(),
    }
}

pub fn title(html: &str) -> String {
    TITLE
        .captures(html)
        .map(|c| decode_entities(WHITESPACE.replace_all(&c[1], " ").trim()))
        .unwrap_or_default()
}

pub fn description(html: &str) -> String {
    DESCRIPTION
        .captures(html)
        .map(|c| decode_entities(c[1].trim()))
        .unwrap_or_default()
}

pub fn visible_text(html: &str) -> String {
    let without_invisible = INVISIBLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_invisible, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Truncates to `max` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
