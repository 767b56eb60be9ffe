//! A UTC instant paired with the zone it is viewed in.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::convert::{to_local, to_utc, Disambiguation, LocalFields};
use crate::error::Result;
use crate::instant::Instant;
use crate::unit::Unit;
use crate::zone::ZoneRef;

/// An instant plus a zone reference.
///
/// Wall-clock fields are derived on demand through the converter, never
/// stored. Setters rebuild the instant from edited local fields, passing the
/// offset in force before the edit as a hint so the result stays on the same
/// side of a DST transition whenever that reading exists. Skipped local times
/// reached by an edit resolve with [`Disambiguation::Later`].
///
/// Equality, ordering and hashing consider the instant only.
#[derive(Debug, Clone)]
pub struct ZonedTimestamp {
    instant: Instant,
    zone: ZoneRef,
}

impl ZonedTimestamp {
    pub fn new(instant: Instant, zone: ZoneRef) -> Self {
        ZonedTimestamp { instant, zone }
    }

    pub fn from_millis(millis: i64, zone: ZoneRef) -> Self {
        ZonedTimestamp::new(Instant::from_millis(millis), zone)
    }

    /// Resolve wall-clock `fields` in `zone`, settling repeated or skipped
    /// local times with `policy`.
    pub fn from_local(fields: &LocalFields, zone: ZoneRef, policy: Disambiguation) -> Result<Self> {
        let instant = to_utc(&zone, fields, None, policy)?;
        Ok(ZonedTimestamp::new(instant, zone))
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn epoch_millis(&self) -> i64 {
        self.instant.as_millis()
    }

    pub fn zone(&self) -> &ZoneRef {
        &self.zone
    }

    /// The same instant viewed in another zone.
    pub fn with_zone(&self, zone: ZoneRef) -> Self {
        ZonedTimestamp::new(self.instant, zone)
    }

    pub fn offset_minutes(&self) -> Result<i32> {
        self.zone.offset_minutes(self.instant)
    }

    pub fn local_fields(&self) -> Result<LocalFields> {
        to_local(&self.zone, self.instant).map(|(fields, _)| fields)
    }

    pub fn year(&self) -> Result<i32> {
        Ok(self.local_fields()?.year)
    }

    /// 1-based.
    pub fn month(&self) -> Result<u32> {
        Ok(self.local_fields()?.month)
    }

    pub fn day(&self) -> Result<u32> {
        Ok(self.local_fields()?.day)
    }

    pub fn hour(&self) -> Result<u32> {
        Ok(self.local_fields()?.hour)
    }

    pub fn minute(&self) -> Result<u32> {
        Ok(self.local_fields()?.minute)
    }

    pub fn second(&self) -> Result<u32> {
        Ok(self.local_fields()?.second)
    }

    pub fn millisecond(&self) -> Result<u32> {
        Ok(self.local_fields()?.millisecond)
    }

    // ── setters ─────────────────────────────────────────────────────────

    pub fn set_year(&mut self, year: i32) -> Result<Instant> {
        self.update(|fields| fields.year = year)
    }

    /// 1-based; 13 rolls into January of the next year.
    pub fn set_month(&mut self, month: u32) -> Result<Instant> {
        self.update(|fields| fields.month = month)
    }

    /// 0 rolls back to the last day of the previous month.
    pub fn set_day(&mut self, day: u32) -> Result<Instant> {
        self.update(|fields| fields.day = day)
    }

    pub fn set_hours(&mut self, hour: u32) -> Result<Instant> {
        self.update(|fields| fields.hour = hour)
    }

    pub fn set_minutes(&mut self, minute: u32) -> Result<Instant> {
        self.update(|fields| fields.minute = minute)
    }

    pub fn set_seconds(&mut self, second: u32) -> Result<Instant> {
        self.update(|fields| fields.second = second)
    }

    pub fn set_milliseconds(&mut self, millisecond: u32) -> Result<Instant> {
        self.update(|fields| fields.millisecond = millisecond)
    }

    /// A copy truncated to the start of `unit`: every finer field zeroed
    /// (day and month reset to 1).
    pub fn start_of(&self, unit: Unit) -> Result<Self> {
        let mut start = self.clone();
        start.update(|fields| {
            if unit <= Unit::Year {
                fields.month = 1;
            }
            if unit <= Unit::Month {
                fields.day = 1;
            }
            if unit <= Unit::Day {
                fields.hour = 0;
            }
            if unit <= Unit::Hour {
                fields.minute = 0;
            }
            if unit <= Unit::Minute {
                fields.second = 0;
            }
            fields.millisecond = 0;
        })?;
        Ok(start)
    }

    fn update(&mut self, edit: impl FnOnce(&mut LocalFields)) -> Result<Instant> {
        let (mut fields, offset) = to_local(&self.zone, self.instant)?;
        edit(&mut fields);
        self.instant = to_utc(&self.zone, &fields, Some(offset), Disambiguation::Later)?;
        Ok(self.instant)
    }
}

impl PartialEq for ZonedTimestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for ZonedTimestamp {}

impl PartialOrd for ZonedTimestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZonedTimestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Hash for ZonedTimestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl From<DateTime<Tz>> for ZonedTimestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        let zone = ZoneRef::from(dt.timezone());
        ZonedTimestamp::new(dt.to_utc().into(), zone)
    }
}
