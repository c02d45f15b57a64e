// src/lib.rs
// Public library surface for the server binary, the CLI and integration tests.

pub mod aggregate;
pub mod analyze;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod scan;
pub mod sentiment;
pub mod state;
pub mod view;

use sha2::{Digest, Sha256};

pub use crate::aggregate::{aggregate, ScanResult, SortMode};
pub use crate::analyze::{Category, ClassifiedItem, Classifier, RiskLevel};
pub use crate::api::router;
pub use crate::config::SentinelConfig;
pub use crate::scan::{ScanQuery, Scanner};
pub use crate::state::AppState;

/// Short stable identifier for a headline or link (sha256, first 6 bytes as hex).
/// Also used to refer to titles in logs without printing them.
pub fn anon_hash(text: &str) -> String {
    let mut h = Sha256::new();
    h.update(text.as_bytes());
    let digest = h.finalize();
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}

/// Router over state built from env/config with the live fetcher.
pub fn app() -> anyhow::Result<axum::Router> {
    Ok(router(AppState::from_env()?))
}

#[cfg(test)]
mod tests {
    use super::anon_hash;

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("Houthi drone strike");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("Houthi drone strike"));
        assert_ne!(a, anon_hash("Houthi drone strikes"));
    }
}
