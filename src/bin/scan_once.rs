//! One-shot scan from the terminal.
//!
//! Usage: `scan_once <target> [window] [--by-date] [--fixture <rss.xml>]`
//!
//! Prints one row per item (`RISK SENT DATE SOURCE TITLE`), or
//! `No intelligence found.` when nothing survives filtering.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chokepoint_sentinel::ingest::providers::GoogleNewsFetcher;
use chokepoint_sentinel::ingest::types::FeedFetcher;
use chokepoint_sentinel::sentiment::LexiconScorer;
use chokepoint_sentinel::{Classifier, ScanQuery, ScanResult, Scanner, SentinelConfig, SortMode};
use tracing_subscriber::EnvFilter;

struct Args {
    target: String,
    window: Option<String>,
    mode: SortMode,
    fixture: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut mode = SortMode::BySeverity;
    let mut fixture = None;

    let mut it = std::env::args().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--by-date" => mode = SortMode::ByRecency,
            "--fixture" => fixture = Some(it.next().context("--fixture needs a path")?),
            _ if a.starts_with("--") => bail!("unknown flag `{a}`"),
            _ => positional.push(a),
        }
    }

    let mut positional = positional.into_iter();
    let Some(target) = positional.next() else {
        bail!("usage: scan_once <target> [window] [--by-date] [--fixture <rss.xml>]");
    };
    Ok(Args {
        target,
        window: positional.next(),
        mode,
        fixture,
    })
}

fn print_result(r: &ScanResult) {
    println!("{} / {} ({} items)", r.target, r.window, r.items.len());
    if r.is_empty() {
        println!("No intelligence found.");
        return;
    }
    println!("{:<9} {:>6} {:<10} {:<24} TITLE", "RISK", "SENT", "DATE", "SOURCE");
    for i in &r.items {
        let date = i
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".into());
        let source: String = i.source.chars().take(24).collect();
        println!(
            "{:<9} {:>6.2} {:<10} {:<24} {}",
            i.risk.as_str(),
            i.sentiment,
            date,
            source,
            i.title
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let cfg = SentinelConfig::load_default()?;

    let fetcher: Arc<dyn FeedFetcher> = match &args.fixture {
        Some(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("reading fixture {path}"))?;
            Arc::new(GoogleNewsFetcher::from_fixture(&xml))
        }
        None => Arc::new(GoogleNewsFetcher::from_settings(cfg.fetch.clone())?),
    };
    let classifier = Arc::new(Classifier::from_config(&cfg, Arc::new(LexiconScorer::new()))?);
    let scanner = Scanner::from_config(&cfg, fetcher, classifier);

    let q = ScanQuery::from_config(&cfg, &args.target, args.window.as_deref())?;
    let result = scanner.run(&q, args.mode).await?;
    print_result(&result);
    Ok(())
}
