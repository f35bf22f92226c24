//! Timestamp text format shared by both stores.
//!
//! Timestamps are persisted as `YYYY-MM-DD HH:MM:SS` in UTC, which is also what
//! SQLite's `CURRENT_TIMESTAMP` produces. RFC 3339 is accepted on read.
//!
//! Text without an offset is always read as UTC. Files written by the older
//! scripts recorded local wall-clock time in this same layout, so their tasks
//! show shifted by the local UTC offset; there is no marker in the data to tell
//! them apart from UTC records.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Persisted timestamp layout
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current time truncated to the persisted resolution.
///
/// Truncating up front keeps a freshly built Task equal to the one read back.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Render a timestamp in the persisted layout.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(FORMAT).to_string()
}

/// Parse a persisted timestamp.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc))
}

/// serde adapter for `DateTime<Utc>` fields
pub mod text {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
    }
}

/// serde adapter for optional `DateTime<Utc>` fields
pub mod text_opt {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_some(&format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
            None => Ok(None),
        }
    }
}
