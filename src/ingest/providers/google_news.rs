// src/ingest/providers/google_news.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::query::{build_search_url, FetchSettings};
use crate::ingest::types::{FeedFetcher, RawEntry};
use crate::ingest::window::FetchWindow;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<SourceTag>,
}

/// `<source url="https://www.reuters.com">Reuters</source>`
#[derive(Debug, Deserialize)]
struct SourceTag {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

/// Google News search feed. Fixture mode serves one canned document for every
/// request (tests and offline runs).
pub struct GoogleNewsFetcher {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        settings: FetchSettings,
    },
}

impl GoogleNewsFetcher {
    pub fn from_fixture(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_settings(settings: FetchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http { client, settings },
        })
    }

    pub fn parse_items_from_str(s: &str) -> Result<Vec<RawEntry>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing google news rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.as_deref().map(str::trim).unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }

            out.push(RawEntry {
                title,
                link: link.to_string(),
                published: it.pub_date.map(|p| p.trim().to_string()),
                summary: it
                    .description
                    .as_deref()
                    .map(normalize_text)
                    .filter(|s| !s.is_empty()),
                source: it
                    .source
                    .and_then(|s| s.name)
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl FeedFetcher for GoogleNewsFetcher {
    async fn fetch(&self, query: &str, window: &FetchWindow) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { client, settings } => {
                let url = build_search_url(settings, query, window);
                tracing::debug!(target: "ingest", %url, "fetching feed slice");

                let resp = client
                    .get(&url)
                    .send()
                    .await
                    .context("google news http get()")?;
                if !resp.status().is_success() {
                    bail!("google news returned status {}", resp.status());
                }
                let body = resp.text().await.context("google news http .text()")?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "GoogleNews"
    }
}

/// HTML entities that are not valid XML entities and would break the parser.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>search</title>
<item>
  <title>Houthi drone strike hits tanker in Red Sea - Reuters</title>
  <link>https://news.google.com/articles/a1</link>
  <pubDate>Fri, 16 Oct 2026 07:00:00 GMT</pubDate>
  <description>&lt;a href="https://x"&gt;Houthi drone strike&lt;/a&gt;&amp;nbsp;&lt;font&gt;Reuters&lt;/font&gt;</description>
  <source url="https://www.reuters.com">Reuters</source>
</item>
<item>
  <title>No link here</title>
</item>
<item>
  <title>Suez transits steady</title>
  <link>https://news.google.com/articles/a2</link>
</item>
</channel></rss>"#;

    #[test]
    fn parses_items_and_skips_incomplete_ones() {
        let items = GoogleNewsFetcher::parse_items_from_str(XML).expect("parse ok");
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.source.as_deref(), Some("Reuters"));
        assert_eq!(first.summary.as_deref(), Some("Houthi drone strike Reuters"));
        assert!(first.published.is_some());

        let second = &items[1];
        assert_eq!(second.summary_text(), "");
        assert_eq!(second.published_text(), "unknown");
        assert_eq!(second.source_name(), "Google News");
    }

    #[test]
    fn empty_channel_yields_no_entries() {
        let xml = r#"<rss version="2.0"><channel><title>t</title></channel></rss>"#;
        assert!(GoogleNewsFetcher::parse_items_from_str(xml)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn broken_xml_is_an_error() {
        assert!(GoogleNewsFetcher::parse_items_from_str("<rss><channel>").is_err());
    }
}
