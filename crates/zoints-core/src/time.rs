//! Ledger timestamps.
//!
//! The remote program stores times as unsigned 64-bit seconds since the Unix
//! epoch. [`UnixTimestamp`] carries that representation so that negative
//! times cannot be constructed.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TimeError;

/// Seconds since the Unix epoch.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct UnixTimestamp(pub u64);

impl UnixTimestamp {
    pub const EPOCH: Self = Self(0);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        // The system clock is never before 1970 in practice; clamp rather than fail.
        Self(Utc::now().timestamp().max(0) as u64)
    }

    /// Convert to a chrono UTC date-time. `None` if beyond chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.0).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Seconds from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<u64> for UnixTimestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl TryFrom<DateTime<Utc>> for UnixTimestamp {
    type Error = TimeError;

    fn try_from(dt: DateTime<Utc>) -> Result<Self, Self::Error> {
        unix_seconds(dt).map(Self)
    }
}

/// Whole seconds since the epoch. Sub-second parts are discarded, never rounded.
pub fn unix_seconds(dt: DateTime<Utc>) -> Result<u64, TimeError> {
    let secs = dt.timestamp();
    u64::try_from(secs).map_err(|_| TimeError::BeforeEpoch(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_subseconds() {
        let dt = Utc.timestamp_opt(1_628_493_518, 999_999_999).unwrap();
        assert_eq!(unix_seconds(dt).unwrap(), 1_628_493_518);
    }

    #[test]
    fn before_epoch_rejected() {
        let dt = Utc.timestamp_opt(-1, 0).unwrap();
        assert_eq!(unix_seconds(dt), Err(TimeError::BeforeEpoch(-1)));
    }

    #[test]
    fn epoch_is_zero() {
        let dt = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(UnixTimestamp::try_from(dt).unwrap(), UnixTimestamp::EPOCH);
    }

    #[test]
    fn display_is_iso8601() {
        assert_eq!(
            UnixTimestamp(0x6110_d6ce).to_string(),
            "2021-08-09T07:18:38Z"
        );
    }

    #[test]
    fn out_of_range_displays_raw() {
        assert_eq!(UnixTimestamp(u64::MAX).to_string(), u64::MAX.to_string());
        assert!(UnixTimestamp(u64::MAX).to_datetime().is_none());
    }

    #[test]
    fn saturating_since() {
        let a = UnixTimestamp(100);
        let b = UnixTimestamp(40);
        assert_eq!(a.saturating_since(b), 60);
        assert_eq!(b.saturating_since(a), 0);
    }

    #[test]
    fn serde_is_bare_number() {
        let json = serde_json::to_string(&UnixTimestamp(42)).unwrap();
        assert_eq!(json, "42");
    }
}
