//! Outbound search URL construction.
//!
//! The window modifier vocabulary (`when:`, `after:`, `before:`) belongs to the
//! upstream source; it is appended to the free-text query verbatim and the whole
//! expression is URL-encoded once.

use serde::{Deserialize, Serialize};

use crate::ingest::window::FetchWindow;

/// Where and how to query the feed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub base_url: String,
    pub hl: String,
    pub gl: String,
    pub ceid: String,
    /// Per-request timeout; a slice that exceeds it contributes nothing.
    pub timeout_secs: u64,
    /// Upper bound on concurrently running slice requests.
    pub concurrency: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
            hl: "en-IN".to_string(),
            gl: "IN".to_string(),
            ceid: "IN:en".to_string(),
            timeout_secs: 5,
            concurrency: 4,
            user_agent: "chokepoint-sentinel/0.1".to_string(),
        }
    }
}

/// Search-expression suffix for one request.
pub fn window_modifier(window: &FetchWindow) -> String {
    match window {
        FetchWindow::Relative { age } => format!("when:{age}"),
        FetchWindow::Range { slice } => format!(
            "after:{} before:{}",
            slice.after.format("%Y-%m-%d"),
            slice.before.format("%Y-%m-%d")
        ),
    }
}

/// Full search expression: the user's query followed by the window modifier.
pub fn search_expression(query: &str, window: &FetchWindow) -> String {
    let q = query.trim();
    let m = window_modifier(window);
    if q.is_empty() {
        m
    } else {
        format!("{q} {m}")
    }
}

/// Feed URL for one request.
pub fn build_search_url(settings: &FetchSettings, query: &str, window: &FetchWindow) -> String {
    format!(
        "{}?q={}&hl={}&gl={}&ceid={}",
        settings.base_url,
        urlencoding::encode(&search_expression(query, window)),
        urlencoding::encode(&settings.hl),
        urlencoding::encode(&settings.gl),
        urlencoding::encode(&settings.ceid),
    )
}
