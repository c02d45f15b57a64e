// src/ingest/mod.rs
//! Feed boundary and the noise/duplicate filter.

pub mod date;
pub mod providers;
pub mod query;
pub mod types;
pub mod window;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ingest::types::RawEntry;

/// Normalize feed text: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. decoded &nbsp;)
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\u{00A0}]+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Which field identifies "the same article" within one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Lower-cased, whitespace-collapsed title.
    #[default]
    Title,
    /// Link when present, title otherwise.
    Link,
}

/// Key under which an entry is deduplicated.
pub fn dedup_key(entry: &RawEntry, policy: DedupPolicy) -> String {
    match policy {
        DedupPolicy::Link if !entry.link.trim().is_empty() => entry.link.trim().to_string(),
        _ => entry
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    }
}

/// True if any (non-empty) excluded term occurs in the title, ignoring case.
pub fn is_excluded(title: &str, excluded_terms: &[String]) -> bool {
    let t = title.to_lowercase();
    excluded_terms
        .iter()
        .map(|term| term.trim().to_lowercase())
        .any(|term| !term.is_empty() && t.contains(term.as_str()))
}

/// Result of one filtering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub kept: Vec<RawEntry>,
    pub excluded: usize,
    pub duplicates: usize,
}

/// Drop noise (excluded terms in the title) and repeats, keeping first occurrences
/// in input order. The seen-set spans the whole input, so it also dedups across
/// time slices once they are concatenated.
pub fn filter_entries(
    entries: Vec<RawEntry>,
    excluded_terms: &[String],
    policy: DedupPolicy,
) -> FilterOutcome {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = FilterOutcome {
        kept: Vec::with_capacity(entries.len()),
        ..Default::default()
    };

    for e in entries {
        if is_excluded(&e.title, excluded_terms) {
            out.excluded += 1;
            continue;
        }
        if !seen.insert(dedup_key(&e, policy)) {
            out.duplicates += 1;
            continue;
        }
        out.kept.push(e);
    }

    out
}
