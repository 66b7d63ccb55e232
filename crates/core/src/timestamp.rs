//! Canonical timestamp encoding for stored documents.
//!
//! Timestamps are stored as RFC 3339 strings in UTC with a fixed microsecond
//! width (`2024-05-01T08:30:00.000000Z`), so the lexicographic order the store
//! sorts by is also the chronological order. Reading accepts any RFC 3339
//! offset and normalizes it to UTC, as well as native BSON datetimes written
//! by other tools.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use mongodb::bson::Bson;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// Current time, truncated to the precision that survives a round trip.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Formats a timestamp in the canonical stored form.
#[must_use]
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp.
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

/// `serde(with = ..)` adapter.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

/// `serde(with = ..)` adapter.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::String(raw) => parse(&raw).map_err(D::Error::custom),
        Bson::DateTime(value) => DateTime::from_timestamp_millis(value.timestamp_millis())
            .ok_or_else(|| D::Error::custom("datetime out of range")),
        other => Err(D::Error::custom(format!(
            "expected a timestamp, found {:?}",
            other.element_type()
        ))),
    }
}
