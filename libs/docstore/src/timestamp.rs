//! Canonical timestamp encoding for stored documents
//!
//! Timestamps are written as RFC 3339 UTC strings with exactly three
//! fractional digits, so lexical order of the stored strings matches
//! chronological order. Any RFC 3339 input is accepted on the way in.
//!
//! Use with `#[serde(with = "docstore::timestamp")]`, or
//! `docstore::timestamp::option` for `Option<DateTime<Utc>>` fields.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// strftime pattern of the stored form
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current time truncated to the stored precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render a timestamp in the stored form
pub fn format(value: &DateTime<Utc>) -> String {
    value.format(FORMAT).to_string()
}

/// Render a timestamp as a JSON value usable in a [`crate::Filter`]
pub fn value(value: &DateTime<Utc>) -> Value {
    Value::String(format(value))
}

/// Parse any RFC 3339 timestamp into UTC
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Same encoding for optional fields
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
