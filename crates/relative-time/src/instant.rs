//! Absolute UTC points in time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{RelativeTimeError, Result};

pub(crate) const MS_PER_SECOND: i64 = 1_000;
pub(crate) const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub(crate) const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub(crate) const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// A UTC timestamp: signed milliseconds since the Unix epoch.
///
/// Any `i64` is accepted. Calendar decomposition happens later and fails with
/// [`RelativeTimeError::OutOfRange`] for instants chrono cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Instant(i64);

impl Instant {
    pub const UNIX_EPOCH: Instant = Instant(0);

    pub const fn from_millis(millis: i64) -> Self {
        Instant(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// The current instant, read from the system clock.
    pub fn now() -> Self {
        Utc::now().into()
    }

    pub fn to_datetime(self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0).ok_or_else(|| {
            RelativeTimeError::OutOfRange(format!("{} ms from the epoch", self.0))
        })
    }

    pub(crate) fn offset_by(self, millis: i64) -> Result<Self> {
        self.0
            .checked_add(millis)
            .map(Instant)
            .ok_or_else(|| RelativeTimeError::OutOfRange(format!("{} + {} ms", self.0, millis)))
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Instant(dt.timestamp_millis())
    }
}

impl From<i64> for Instant {
    fn from(millis: i64) -> Self {
        Instant(millis)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Ok(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            Err(_) => write!(f, "{}ms", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_round_trips_through_chrono() {
        let dt = Utc.with_ymd_and_hms(2016, 4, 10, 12, 0, 0).unwrap();
        let instant = Instant::from(dt);
        assert_eq!(instant.as_millis(), 1_460_289_600_000);
        assert_eq!(instant.to_datetime().unwrap(), dt);
    }

    #[test]
    fn test_display_is_rfc3339_utc() {
        let instant = Instant::from_millis(1_460_289_600_123);
        assert_eq!(instant.to_string(), "2016-04-10T12:00:00.123Z");
    }

    #[test]
    fn test_out_of_range_decomposition_fails() {
        let err = Instant::from_millis(i64::MAX).to_datetime().unwrap_err();
        assert!(matches!(err, RelativeTimeError::OutOfRange(_)));
    }

    #[test]
    fn test_offset_by_detects_overflow() {
        assert!(Instant::from_millis(i64::MAX).offset_by(1).is_err());
        assert_eq!(
            Instant::UNIX_EPOCH.offset_by(-MS_PER_DAY).unwrap().as_millis(),
            -86_400_000
        );
    }
}
