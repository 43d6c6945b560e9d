//! Custom types for common data structures and validation

use chrono::{DateTime as ChronoDateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Database DateTime type used across all Temps crates
///
/// This is the canonical datetime type for database TIMESTAMPTZ columns.
pub type DBDateTime = ChronoDateTime<Utc>;

/// Standard UTC DateTime type used across all Temps crates
///
/// Serializes as ISO 8601 with a UTC offset, e.g. `2025-10-12T12:15:47.609192Z`.
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Parse a datetime leniently.
///
/// Accepts:
/// - `2024-01-15T14:30:00Z` / `2024-01-15T14:30:00+02:00` (RFC 3339)
/// - `2024-01-15T14:30:00` (naive, assumed UTC)
/// - `2024-01-15` (midnight UTC)
pub fn parse_utc_datetime(input: &str) -> Option<UtcDateTime> {
    let input = input.trim();

    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(ChronoDateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| ChronoDateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

fn deserialize_lenient<'de, D>(deserializer: D) -> Result<UtcDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_utc_datetime(&s).ok_or_else(|| {
        serde::de::Error::custom("Invalid datetime format. Use ISO 8601: YYYY-MM-DDTHH:MM:SSZ")
    })
}

/// Inclusive time window `[start, end]` used by aggregate queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(deserialize_with = "deserialize_lenient")]
    pub start: UtcDateTime,
    #[serde(deserialize_with = "deserialize_lenient")]
    pub end: UtcDateTime,
}

impl DateRange {
    /// Build a range, swapping the bounds if they were given in reverse
    pub fn new(start: UtcDateTime, end: UtcDateTime) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The last `days` days up to `now`
    pub fn last_days(now: UtcDateTime, days: i64) -> Self {
        Self::new(now - Duration::days(days), now)
    }

    /// The window of equal length right before this one.
    ///
    /// Both ranges are inclusive, so the previous one ends a nanosecond
    /// before `start` and an instant is never counted in both.
    pub fn previous_period(&self) -> Self {
        let length = self.end - self.start;
        Self {
            start: self.start - length,
            end: self.start - Duration::nanoseconds(1),
        }
    }

    pub fn contains(&self, at: UtcDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}
