//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the time representation stamped into new ledger
//! records: RFC 3339 UTC with a `Z` suffix, truncated to seconds
//! (`2024-01-02T15:04:05Z`).
//!
//! ## Determinism
//!
//! Every endorsing peer executes the same invocation and must write the
//! same bytes. Offsets such as `+05:30` or sub-second digits would make two
//! renderings of one instant differ, so freshly stamped values never carry
//! them.
//! Encoding of fresh values is strict.
//!
//! ## Stored Values
//!
//! Records already on the ledger may carry milliseconds or offsets. Those
//! are decoded into [`RecordedTime`], which keeps the stored text and
//! writes it back unchanged, so rewriting a record never alters history.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContractError;

/// Render format for every timestamp on the ledger.
const RFC3339_UTC_SECONDS: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serializes as a JSON string in the fixed `YYYY-MM-DDTHH:MM:SSZ` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a strict `Z`-suffixed RFC 3339 string.
    ///
    /// Explicit offsets, including `+00:00`, are rejected.
    pub fn parse(s: &str) -> Result<Self, ContractError> {
        if !s.ends_with('Z') {
            return Err(ContractError::invalid_argument(
                "timestamp",
                format!("must use Z suffix (UTC only), got {s:?}"),
            ));
        }
        Self::parse_lenient(s)
    }

    /// Parse any RFC 3339 string and convert it to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, ContractError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ContractError::invalid_argument("timestamp", format!("invalid RFC 3339 {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ContractError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| {
                ContractError::invalid_argument("timestamp", format!("invalid Unix time {secs}"))
            })
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_rfc3339(&self) -> String {
        self.0.format(RFC3339_UTC_SECONDS).to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_lenient(&raw).map_err(serde::de::Error::custom)
    }
}

/// A timestamp field of a stored record.
///
/// Built from a [`Timestamp`] it renders canonically. Decoded from ledger
/// bytes it keeps the exact text it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordedTime {
    instant: Timestamp,
    text: String,
}

impl RecordedTime {
    /// The instant, truncated to seconds.
    pub fn instant(&self) -> Timestamp {
        self.instant
    }

    /// The text written to the ledger.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if the stored text is not the canonical rendering.
    pub fn is_legacy(&self) -> bool {
        self.text != self.instant.to_rfc3339()
    }
}

impl From<Timestamp> for RecordedTime {
    fn from(instant: Timestamp) -> Self {
        Self {
            instant,
            text: instant.to_rfc3339(),
        }
    }
}

impl PartialEq<Timestamp> for RecordedTime {
    fn eq(&self, other: &Timestamp) -> bool {
        self.instant == *other
    }
}

impl std::fmt::Display for RecordedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for RecordedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for RecordedTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let instant = Timestamp::parse_lenient(&text).map_err(serde::de::Error::custom)?;
        Ok(Self { instant, text })
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
