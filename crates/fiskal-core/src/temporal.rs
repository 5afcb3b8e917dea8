//! # Temporal Types — UTC Message Time and Local Issue Time
//!
//! Two clocks appear in the protocol and they must never be mixed:
//!
//! - [`Timestamp`] — UTC, seconds precision, rendered
//!   `YYYY-MM-DDTHH:MM:SSZ`. Used for message headers and validity dates.
//! - [`IssueDateTime`] — the wall-clock time printed on the receipt, with
//!   no zone. It feeds the ZOI signable string (`DD.MM.YYYY HH:mm:ss`),
//!   the QR code (`YYMMDDHHmmss`) and the wire payload
//!   (`YYYY-MM-DDTHH:MM:SS`).
//!
//! ## Security Invariant
//!
//! Both types truncate sub-second components at construction, so every
//! rendering is deterministic for a given value.

use chrono::{DateTime, Local, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CanonicalizationError;

/// Layout of the issue time inside the ZOI signable string.
pub const SIGNABLE_LAYOUT: &str = "%d.%m.%Y %H:%M:%S";

/// Layout of the issue time inside the QR control code.
pub const QR_LAYOUT: &str = "%y%m%d%H%M%S";

/// Layout of the issue time in the wire payload.
pub const WIRE_LOCAL_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string with a `Z` suffix.
    ///
    /// Explicit offsets, including `+00:00`, are rejected.
    pub fn parse(s: &str) -> Result<Self, CanonicalizationError> {
        if !s.ends_with('Z') {
            return Err(CanonicalizationError::InvalidTimestamp {
                value: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            CanonicalizationError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Local wall-clock issue time of an invoice, seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IssueDateTime(NaiveDateTime);

impl IssueDateTime {
    /// The current local time, truncated to seconds.
    pub fn now_local() -> Self {
        Self::from_naive(Local::now().naive_local())
    }

    /// Wrap a naive local datetime, truncating sub-seconds.
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse the signable layout `DD.MM.YYYY HH:mm:ss`.
    pub fn parse_signable(s: &str) -> Result<Self, CanonicalizationError> {
        Self::parse_with(s, SIGNABLE_LAYOUT)
    }

    /// Parse the wire layout `YYYY-MM-DDTHH:MM:SS`.
    pub fn parse_wire(s: &str) -> Result<Self, CanonicalizationError> {
        Self::parse_with(s, WIRE_LOCAL_LAYOUT)
    }

    fn parse_with(s: &str, layout: &str) -> Result<Self, CanonicalizationError> {
        NaiveDateTime::parse_from_str(s, layout)
            .map(Self::from_naive)
            .map_err(|e| CanonicalizationError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Access the inner naive datetime.
    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// `DD.MM.YYYY HH:mm:ss`, as signed into the ZOI.
    pub fn to_signable(&self) -> String {
        self.0.format(SIGNABLE_LAYOUT).to_string()
    }

    /// `YYMMDDHHmmss`, as embedded in the QR code.
    pub fn to_qr_digits(&self) -> String {
        self.0.format(QR_LAYOUT).to_string()
    }

    /// `YYYY-MM-DDTHH:MM:SS`, as sent on the wire.
    pub fn to_wire(&self) -> String {
        self.0.format(WIRE_LOCAL_LAYOUT).to_string()
    }
}

impl std::fmt::Display for IssueDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_signable())
    }
}

impl Serialize for IssueDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for IssueDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_wire(&s).map_err(serde::de::Error::custom)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
