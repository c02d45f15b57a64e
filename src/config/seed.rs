// src/config/seed.rs
//! Built-in configuration used when no file is present.

use super::{SentinelConfig, TargetCfg, WindowCfg};
use crate::analyze::risk::Thresholds;
use crate::analyze::taxonomy::default_taxonomy;
use crate::ingest::query::FetchSettings;
use crate::ingest::window::{RelativeAge, TimeWindow};
use crate::ingest::DedupPolicy;
use crate::view::ViewSettings;

impl Default for SentinelConfig {
    fn default() -> Self {
        let targets = [
            (
                "Strait of Malacca",
                r#""Strait of Malacca" OR "Singapore Strait" OR "Malacca Strait""#,
            ),
            (
                "Taiwan Strait",
                r#""Taiwan Strait" OR "PLA navy" OR "TSMC" OR "Taiwan defense""#,
            ),
            (
                "Red Sea / Suez",
                r#""Red Sea" OR "Suez Canal" OR "Houthi" OR "Bab el-Mandeb""#,
            ),
            (
                "South China Sea",
                r#""South China Sea" OR "Spratly Islands" OR "Second Thomas Shoal""#,
            ),
            (
                "Indian Ocean",
                r#""Indian Ocean" OR "Hambantota port" OR "Diego Garcia" OR "Andaman Sea""#,
            ),
            (
                "Semiconductor Supply",
                r#""TSMC" OR "Nvidia" OR "Foxconn" OR "semiconductor supply chain""#,
            ),
        ]
        .into_iter()
        .map(|(name, query)| TargetCfg {
            name: name.to_string(),
            query: query.to_string(),
            description: None,
        })
        .collect();

        let excluded_terms = [
            "Ukraine", "Russia", "Kyiv", "Moscow", "Putin", "Zelensky", "Gaza", "Hamas", "Israel",
            "Palestin", "Venezuela", "Caracas", "Maduro", "Football", "Cricket", "Movie", "Celeb",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let windows = vec![
            window("Last 1 Hour", TimeWindow::Relative { age: RelativeAge::hours(1) }),
            window("Last 24 Hours", TimeWindow::Relative { age: RelativeAge::days(1) }),
            window("Last 7 Days", TimeWindow::Relative { age: RelativeAge::days(7) }),
            window("Past 1 Month", TimeWindow::Sliced { days: 30, slices: 3 }),
            window("Past 1 Year", TimeWindow::Sliced { days: 365, slices: 12 }),
        ];

        let critical_phrases = [
            "missile attack",
            "missile strike",
            "drone strike",
            "drone attack",
            "port blocked",
            "port closed",
            "strait closed",
            "canal blocked",
            "sanctions imposed",
            "export ban",
            "collision at sea",
            "ship sinking",
            "vessel sinks",
            "tanker attacked",
            "vessel seized",
            "shipping suspended",
            "naval blockade",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            targets,
            excluded_terms,
            windows,
            default_window: "Last 7 Days".to_string(),
            critical_phrases,
            taxonomy: default_taxonomy(),
            thresholds: Thresholds::default(),
            dedup: DedupPolicy::Title,
            fetch: FetchSettings::default(),
            view: ViewSettings::default(),
        }
    }
}

fn window(label: &str, window: TimeWindow) -> WindowCfg {
    WindowCfg {
        label: label.to_string(),
        window,
    }
}
