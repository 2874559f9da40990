//! # Temporal Types — UTC-Only Timestamps
//!
//! [`Timestamp`] is a UTC instant truncated to whole seconds. Status list
//! documents publish `validFrom`/`validUntil` from these values, and the
//! persisted `createdAt`/`updatedAt` columns must read back bit-for-bit
//! equal to what was written, which sub-second precision would break on
//! datastores that store microseconds.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Add a duration in milliseconds, truncating the result to seconds.
    ///
    /// Returns `None` on overflow.
    pub fn checked_add_millis(&self, millis: u64) -> Option<Self> {
        let millis = i64::try_from(millis).ok()?;
        let dt = self.0.checked_add_signed(Duration::try_milliseconds(millis)?)?;
        Some(Self(truncate_to_seconds(dt)))
    }

    /// Render as ISO 8601 with `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
