use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Server-assigned preset identifier.
pub type PresetId = i32;

/// All timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Deserialize a [`Timestamp`] from either an RFC 3339 string with an
/// offset or an offset-less ISO-8601 date-time, which is read as UTC.
///
/// The Codex server serializes .NET `DateTime` values, which omit the
/// offset when the kind is unspecified.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid timestamp '{raw}'"))
    })
}

/// Parse a timestamp string, see [`deserialize_timestamp`].
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
