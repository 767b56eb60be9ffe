//! Calendar-aware differences between two zoned timestamps.
//!
//! Years and months subtract calendar fields. Hours, minutes and seconds
//! truncate both timestamps to the start of the unit in their shared zone,
//! subtract the instants, and divide by the unit's length rounding toward
//! the direction of travel (floor when the target is later, ceiling when it
//! is earlier). Days do the same with local midnights measured on the wall
//! clock, so a 23- or 25-hour DST day still counts as exactly one.
//!
//! Two instants on the same calendar day are 0 days apart, while crossing
//! midnight by a minute is already one day.

use std::cell::OnceCell;

use serde::Serialize;

use crate::convert::{days_in_month, LocalFields};
use crate::error::{RelativeTimeError, Result};
use crate::instant::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND};
use crate::unit::Unit;
use crate::zoned::ZonedTimestamp;

/// Signed differences from `now` to `target`, computed per unit on first
/// access and cached for the life of the set.
#[derive(Debug)]
pub struct DifferenceSet {
    now: ZonedTimestamp,
    target: ZonedTimestamp,
    past_hour_correction: bool,
    years: OnceCell<i64>,
    months: OnceCell<i64>,
    days: OnceCell<i64>,
    hours: OnceCell<i64>,
    minutes: OnceCell<i64>,
    seconds: OnceCell<i64>,
}

/// Every unit of a [`DifferenceSet`], evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Differences {
    pub millis: i64,
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Differences {
    pub fn get(&self, unit: Unit) -> i64 {
        match unit {
            Unit::Year => self.years,
            Unit::Month => self.months,
            Unit::Day => self.days,
            Unit::Hour => self.hours,
            Unit::Minute => self.minutes,
            Unit::Second => self.seconds,
        }
    }
}

impl DifferenceSet {
    /// # Errors
    ///
    /// Returns [`RelativeTimeError::ZoneMismatch`] unless both timestamps
    /// are viewed in the same zone.
    pub fn new(now: ZonedTimestamp, target: ZonedTimestamp) -> Result<Self> {
        if now.zone() != target.zone() {
            return Err(RelativeTimeError::ZoneMismatch {
                target: target.zone().to_string(),
                now: now.zone().to_string(),
            });
        }
        Ok(DifferenceSet {
            now,
            target,
            past_hour_correction: false,
            years: OnceCell::new(),
            months: OnceCell::new(),
            days: OnceCell::new(),
            hours: OnceCell::new(),
            minutes: OnceCell::new(),
            seconds: OnceCell::new(),
        })
    }

    /// Report `-1` hours instead of `0` when the target lies earlier within
    /// the same clock hour as `now`, so a past target never reads "this
    /// hour".
    pub fn with_past_hour_correction(mut self, enabled: bool) -> Self {
        self.past_hour_correction = enabled;
        self.hours = OnceCell::new();
        self
    }

    pub fn now(&self) -> &ZonedTimestamp {
        &self.now
    }

    pub fn target(&self) -> &ZonedTimestamp {
        &self.target
    }

    /// Raw signed gap in milliseconds.
    pub fn millis(&self) -> i64 {
        self.target.epoch_millis() - self.now.epoch_millis()
    }

    pub fn years(&self) -> Result<i64> {
        memo(&self.years, || {
            Ok(i64::from(self.target.year()?) - i64::from(self.now.year()?))
        })
    }

    pub fn months(&self) -> Result<i64> {
        memo(&self.months, || {
            let months = i64::from(self.target.month()?) - i64::from(self.now.month()?);
            Ok(self.years()? * 12 + months)
        })
    }

    pub fn days(&self) -> Result<i64> {
        memo(&self.days, || {
            let gap = local_midnight(&self.target)? - local_midnight(&self.now)?;
            Ok(self.round(gap, MS_PER_DAY))
        })
    }

    pub fn hours(&self) -> Result<i64> {
        memo(&self.hours, || {
            let hours = self.truncated(Unit::Hour, MS_PER_HOUR)?;
            if self.past_hour_correction && hours == 0 && self.minutes()? < 0 {
                return Ok(-1);
            }
            Ok(hours)
        })
    }

    pub fn minutes(&self) -> Result<i64> {
        memo(&self.minutes, || self.truncated(Unit::Minute, MS_PER_MINUTE))
    }

    pub fn seconds(&self) -> Result<i64> {
        memo(&self.seconds, || self.truncated(Unit::Second, MS_PER_SECOND))
    }

    pub fn get(&self, unit: Unit) -> Result<i64> {
        match unit {
            Unit::Year => self.years(),
            Unit::Month => self.months(),
            Unit::Day => self.days(),
            Unit::Hour => self.hours(),
            Unit::Minute => self.minutes(),
            Unit::Second => self.seconds(),
        }
    }

    /// Day-of-month delta carried across a month boundary.
    ///
    /// Starts from `target.day - now.day`; when the months differ, adds the
    /// length of `now`'s month (moving forward) or subtracts the length of
    /// `target`'s month (moving backward). Jan 31 → Feb 2 reads 2, not -29.
    pub fn carried_days(&self) -> Result<i64> {
        let now = self.now.local_fields()?;
        let target = self.target.local_fields()?;
        let mut days = i64::from(target.day) - i64::from(now.day);
        if self.months()? != 0 {
            if self.millis() > 0 {
                days += i64::from(days_in_month(now.year, now.month));
            } else {
                days -= i64::from(days_in_month(target.year, target.month));
            }
        }
        Ok(days)
    }

    pub fn snapshot(&self) -> Result<Differences> {
        Ok(Differences {
            millis: self.millis(),
            years: self.years()?,
            months: self.months()?,
            days: self.days()?,
            hours: self.hours()?,
            minutes: self.minutes()?,
            seconds: self.seconds()?,
        })
    }

    fn truncated(&self, unit: Unit, unit_millis: i64) -> Result<i64> {
        let target = self.target.start_of(unit)?.epoch_millis();
        let now = self.now.start_of(unit)?.epoch_millis();
        Ok(self.round(target - now, unit_millis))
    }

    fn round(&self, gap: i64, unit_millis: i64) -> i64 {
        if self.millis() > 0 {
            gap.div_euclid(unit_millis)
        } else {
            ceil_div(gap, unit_millis)
        }
    }
}

/// Midnight of the timestamp's local date, as a local timestamp.
fn local_midnight(ts: &ZonedTimestamp) -> Result<i64> {
    let fields = ts.local_fields()?;
    LocalFields::new(fields.year, fields.month, fields.day, 0, 0, 0).to_local_millis()
}

fn memo(cell: &OnceCell<i64>, compute: impl FnOnce() -> Result<i64>) -> Result<i64> {
    if let Some(value) = cell.get() {
        return Ok(*value);
    }
    let value = compute()?;
    Ok(*cell.get_or_init(|| value))
}

fn ceil_div(n: i64, d: i64) -> i64 {
    -(-n).div_euclid(d)
}
