//! # Web Collaborators
//!
//! Search and browsing used by the `web_search` and `browse_web` tools.
//! Both sit outside the sandbox and share one HTTP client.

pub mod browser;
pub mod html;
pub mod search;

pub use browser::{BrowserSession, HttpBrowser, fetch_webpage};
pub use search::{DuckDuckGoSearch, SearchProvider};

use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

const USER_AGENT: &str = concat!("manus-mcp/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default()
    })
}
