//! Reporting units and the best-fit selector.
//!
//! [`best_fit`] walks from the coarsest unit to the finest and promotes a
//! coarse unit only when it is non-zero *and* the next finer unit has nearly
//! completed a full coarse unit, as measured by [`THRESHOLDS`]. That keeps a
//! gap of 23h59m reading "23 hours ago" rather than "yesterday" unless the
//! calendar day actually changed.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{RelativeTimeError, Result};

/// A unit a relative-time phrase can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    /// Coarsest first.
    pub const ALL: [Unit; 6] = [
        Unit::Year,
        Unit::Month,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::Year => "year",
            Unit::Month => "month",
            Unit::Day => "day",
            Unit::Hour => "hour",
            Unit::Minute => "minute",
            Unit::Second => "second",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = RelativeTimeError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == singular)
            .ok_or_else(|| RelativeTimeError::InvalidUnit(format!("'{s}'")))
    }
}

/// Which unit to report: a fixed one, or whichever [`best_fit`] picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitOption {
    #[default]
    BestFit,
    #[serde(untagged)]
    Unit(Unit),
}

impl From<Unit> for UnitOption {
    fn from(unit: Unit) -> Self {
        UnitOption::Unit(unit)
    }
}

impl FromStr for UnitOption {
    type Err = RelativeTimeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("best-fit") {
            return Ok(UnitOption::BestFit);
        }
        s.parse().map(UnitOption::Unit)
    }
}

// ── Thresholds ──────────────────────────────────────────────────────────────

/// How far the finer unit must run before the coarser one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    /// Months before switching to years.
    pub month: i64,
    /// Days before switching to months.
    pub day: i64,
    /// Hours before switching to days.
    pub hour: i64,
    /// Minutes before switching to hours.
    pub minute: i64,
    /// Seconds before switching to minutes.
    pub second: i64,
}

pub const THRESHOLDS: Thresholds = Thresholds {
    month: 2,
    day: 6,
    hour: 6,
    minute: 59,
    second: 59,
};

/// Pick the unit to report from per-unit differences.
///
/// `magnitude` is asked for units lazily, coarsest first, and only as far as
/// the rules need; its sign is ignored. The first rule that holds wins:
///
/// | report  | when                                   |
/// |---------|----------------------------------------|
/// | year    | years ≠ 0 and \|months\| > 2           |
/// | month   | months ≠ 0 and \|days\| > 6            |
/// | day     | days ≠ 0 and \|hours\| > 6             |
/// | hour    | hours ≠ 0 and \|minutes\| > 59         |
/// | minute  | minutes ≠ 0 and \|seconds\| > 59       |
/// | second  | otherwise                              |
///
/// # Examples
///
/// ```
/// use relative_time::{best_fit_from, Unit};
///
/// // 59 minutes 59 seconds stays in minutes; a full hour does not.
/// let diff = |unit| match unit {
///     Unit::Minute => 59,
///     Unit::Second => 3599,
///     _ => 0,
/// };
/// assert_eq!(best_fit_from(diff), Unit::Minute);
/// ```
pub fn best_fit<E>(
    mut magnitude: impl FnMut(Unit) -> std::result::Result<i64, E>,
) -> std::result::Result<Unit, E> {
    let rules = [
        (Unit::Year, Unit::Month, THRESHOLDS.month),
        (Unit::Month, Unit::Day, THRESHOLDS.day),
        (Unit::Day, Unit::Hour, THRESHOLDS.hour),
        (Unit::Hour, Unit::Minute, THRESHOLDS.minute),
        (Unit::Minute, Unit::Second, THRESHOLDS.second),
    ];

    for (coarse, fine, threshold) in rules {
        if magnitude(coarse)? != 0 && magnitude(fine)?.abs() > threshold {
            return Ok(coarse);
        }
    }
    Ok(Unit::Second)
}

/// [`best_fit`] over differences that are already known.
pub fn best_fit_from(mut magnitude: impl FnMut(Unit) -> i64) -> Unit {
    let picked: std::result::Result<Unit, Infallible> = best_fit(|unit| Ok(magnitude(unit)));
    match picked {
        Ok(unit) => unit,
        Err(never) => match never {},
    }
}
