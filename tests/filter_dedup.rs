// tests/filter_dedup.rs
use chokepoint_sentinel::ingest::types::RawEntry;
use chokepoint_sentinel::ingest::{filter_entries, DedupPolicy};

fn terms(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn keeps_first_occurrence_in_input_order() {
    let raw = vec![
        RawEntry::new("Tanker delayed at Suez", "https://n/1"),
        RawEntry::new("Strait reopens", "https://n/2"),
        RawEntry::new("tanker  delayed at SUEZ", "https://n/3"),
        RawEntry::new("Ferry resumes", "https://n/4"),
    ];
    let out = filter_entries(raw, &[], DedupPolicy::Title);
    let links: Vec<&str> = out.kept.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(links, vec!["https://n/1", "https://n/2", "https://n/4"]);
    assert_eq!(out.duplicates, 1);
    assert_eq!(out.excluded, 0);
}

#[test]
fn excluded_terms_are_counted_before_dedup() {
    let raw = vec![
        RawEntry::new("Moscow talks stall", "https://n/1"),
        RawEntry::new("Moscow talks stall", "https://n/2"),
        RawEntry::new("Hormuz traffic normal", "https://n/3"),
    ];
    let out = filter_entries(raw, &terms(&["moscow"]), DedupPolicy::Title);
    assert_eq!(out.kept.len(), 1);
    assert_eq!(out.excluded, 2);
    assert_eq!(out.duplicates, 0);
}

#[test]
fn link_policy_keeps_same_title_from_different_links() {
    let raw = vec![
        RawEntry::new("Canal update", "https://a/1"),
        RawEntry::new("Canal update", "https://b/1"),
        RawEntry::new("Other headline", "https://a/1"),
        RawEntry::new("No link story", ""),
        RawEntry::new("no link STORY", " "),
    ];
    let out = filter_entries(raw, &[], DedupPolicy::Link);
    assert_eq!(out.kept.len(), 3);
    assert_eq!(out.duplicates, 2);
}

#[test]
fn empty_input_is_fine() {
    let out = filter_entries(Vec::new(), &terms(&["x"]), DedupPolicy::default());
    assert!(out.kept.is_empty());
    assert_eq!((out.excluded, out.duplicates), (0, 0));
}
