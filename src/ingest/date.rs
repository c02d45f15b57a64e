// src/ingest/date.rs
use chrono::NaiveDate;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

/// Normalize a loosely formatted publication timestamp to its UTC calendar date.
///
/// Tries RFC 2822 (RSS `pubDate`), then RFC 3339 (Atom), then a bare `YYYY-MM-DD`.
/// Anything else is `None` ("unknown").
pub fn normalize_published(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).date());

    if let Some(d) = parsed {
        return NaiveDate::from_ymd_opt(
            d.year(),
            u32::from(u8::from(d.month())),
            u32::from(d.day()),
        );
    }
    // Obsolete zone names (e.g. "EST") that the strict parser rejects.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&chrono::Utc).date_naive());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Serde adapter: `Option<NaiveDate>` as `"YYYY-MM-DD"` or `"unknown"`.
pub mod date_or_unknown {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::ingest::types::UNKNOWN_PUBLISHED;

    pub fn serialize<S: Serializer>(d: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.collect_str(&d.format("%Y-%m-%d")),
            None => s.serialize_str(UNKNOWN_PUBLISHED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let s = String::deserialize(d)?;
        if s == UNKNOWN_PUBLISHED {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    #[test]
    fn rss_pub_date_is_normalized_to_utc_day() {
        assert_eq!(
            normalize_published(Some("Thu, 15 Oct 2026 23:30:00 -0500")),
            d(2026, 10, 16)
        );
        assert_eq!(
            normalize_published(Some("Fri, 16 Oct 2026 07:00:00 GMT")),
            d(2026, 10, 16)
        );
    }

    #[test]
    fn atom_and_bare_dates_are_accepted() {
        assert_eq!(
            normalize_published(Some("2026-10-14T08:00:00Z")),
            d(2026, 10, 14)
        );
        assert_eq!(normalize_published(Some("2026-10-13")), d(2026, 10, 13));
    }

    #[test]
    fn garbage_and_missing_are_unknown() {
        assert_eq!(normalize_published(Some("yesterday-ish")), None);
        assert_eq!(normalize_published(Some("  ")), None);
        assert_eq!(normalize_published(None), None);
    }
}
