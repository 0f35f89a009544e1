//! Serde helpers for instants carried as ISO-8601 strings.
//!
//! Use with `#[serde(with = "crate::utils::iso8601")]` and friends.

use super::time::{format_instant, parse_instant};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_instant(instant))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).ok_or_else(|| D::Error::custom(format!("invalid instant: {}", raw)))
}

/// Optional instants; `null` and empty strings read as `None`
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        instant: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match instant {
            Some(instant) => serializer.serialize_str(&format_instant(instant)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_instant(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid instant: {}", raw))),
            None => Ok(None),
        }
    }
}

/// Patch fields: outer `None` is skipped, `Some(None)` is sent as `null`
pub mod patch {
    use super::*;

    pub fn serialize<S: Serializer>(
        instant: &Option<Option<DateTime<Utc>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match instant {
            Some(Some(instant)) => serializer.serialize_str(&format_instant(instant)),
            _ => serializer.serialize_none(),
        }
    }
}

/// Deserialize a field that distinguishes absent (`None`) from `null` (`Some(None)`).
///
/// Needs `#[serde(default)]` on the field so absence falls back to `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
