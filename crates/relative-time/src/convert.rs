//! Conversion between UTC instants and local wall-clock fields.
//!
//! [`to_local`] is a direct lookup. [`to_utc`] has to invert it, and the
//! offset it needs depends on the instant it is solving for, so it runs a
//! bounded fixed-point iteration instead:
//!
//! 1. Guess an offset (the caller's hint, or the offset at the local
//!    timestamp read as if it were UTC).
//! 2. Apply it, look up the offset at the resulting instant, apply that.
//! 3. Stop when the candidate no longer moves (unique or repeated local
//!    time) or when it alternates between two candidates (skipped local
//!    time inside a spring-forward gap).
//!
//! Repeated and skipped local times are settled by a [`Disambiguation`]
//! policy. A hint that lands on a fixed point is always honoured, which is
//! what keeps field-by-field edits continuous through a DST transition.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use tracing::trace;

use crate::error::{RelativeTimeError, Result};
use crate::instant::{Instant, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND};
use crate::zone::ZoneRef;

/// Upper bound on refinement steps in [`to_utc`].
const MAX_ITERATIONS: usize = 8;

// ── LocalFields ─────────────────────────────────────────────────────────────

/// Wall-clock calendar fields with no associated zone. `month` is 1-based.
///
/// Fields may temporarily hold out-of-range values (month 13, day 0, hour
/// 24); composition normalises them the way a calendar date's setters do,
/// rolling over into the neighbouring unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LocalFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl LocalFields {
    pub const fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        LocalFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond: 0,
        }
    }

    pub const fn with_millisecond(mut self, millisecond: u32) -> Self {
        self.millisecond = millisecond;
        self
    }

    /// Decompose a local timestamp (milliseconds, read as if UTC) into fields.
    pub fn from_local_millis(millis: i64) -> Result<Self> {
        let dt = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            RelativeTimeError::OutOfRange(format!("local timestamp {millis} ms"))
        })?;
        Ok(LocalFields::from(dt.naive_utc()))
    }

    /// Compose the fields into a local timestamp (milliseconds, read as if
    /// UTC), normalising any overflowing field.
    ///
    /// # Examples
    ///
    /// ```
    /// use relative_time::LocalFields;
    ///
    /// // Month 13 rolls into January of the next year.
    /// let overflow = LocalFields::new(2016, 13, 1, 0, 0, 0);
    /// let expected = LocalFields::new(2017, 1, 1, 0, 0, 0);
    /// assert_eq!(overflow.to_local_millis().unwrap(), expected.to_local_millis().unwrap());
    /// ```
    pub fn to_local_millis(&self) -> Result<i64> {
        let out_of_range = || RelativeTimeError::OutOfRange(format!("local fields {self}"));

        let month0 = i64::from(self.month) - 1;
        let year = i64::from(self.year) + month0.div_euclid(12);
        let month = month0.rem_euclid(12) + 1;
        let year = i32::try_from(year).map_err(|_| out_of_range())?;
        let first = NaiveDate::from_ymd_opt(year, month as u32, 1).ok_or_else(out_of_range)?;

        let within_month = (i64::from(self.day) - 1) * MS_PER_DAY
            + i64::from(self.hour) * MS_PER_HOUR
            + i64::from(self.minute) * MS_PER_MINUTE
            + i64::from(self.second) * MS_PER_SECOND
            + i64::from(self.millisecond);

        first
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| {
                midnight.checked_add_signed(chrono::Duration::milliseconds(within_month))
            })
            .map(|naive| naive.and_utc().timestamp_millis())
            .ok_or_else(out_of_range)
    }

    /// The same fields with every overflow rolled into its neighbour.
    pub fn normalized(&self) -> Result<Self> {
        LocalFields::from_local_millis(self.to_local_millis()?)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }
}

impl From<NaiveDateTime> for LocalFields {
    fn from(naive: NaiveDateTime) -> Self {
        LocalFields {
            year: naive.year(),
            month: naive.month(),
            day: naive.day(),
            hour: naive.hour(),
            minute: naive.minute(),
            second: naive.second(),
            millisecond: naive.and_utc().timestamp_subsec_millis(),
        }
    }
}

impl fmt::Display for LocalFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond
        )
    }
}

/// Number of days in `month` (1-based) of `year`, proleptic Gregorian.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year.saturating_add(1), 1)
    } else {
        (year, month.max(1) + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

// ── Disambiguation ──────────────────────────────────────────────────────────

/// How [`to_utc`] settles a local time that maps to zero or two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disambiguation {
    /// Repeated time: the later (post-transition) instant. Skipped time: the
    /// later of the two oscillating candidates.
    #[default]
    Later,
    /// Repeated time: the earlier (pre-transition) instant. Skipped time:
    /// the earlier candidate.
    Earlier,
    /// Fail with [`RelativeTimeError::AmbiguousLocalTime`] or
    /// [`RelativeTimeError::SkippedLocalTime`].
    Reject,
}

impl Disambiguation {
    fn repeated(self, earlier: i64, later: i64, fields: &LocalFields, zone: &ZoneRef) -> Result<i64> {
        match self {
            Disambiguation::Later => Ok(later),
            Disambiguation::Earlier => Ok(earlier),
            Disambiguation::Reject => Err(RelativeTimeError::AmbiguousLocalTime(format!(
                "{fields} occurs twice in {zone}"
            ))),
        }
    }

    fn skipped(self, earlier: i64, later: i64, fields: &LocalFields, zone: &ZoneRef) -> Result<i64> {
        match self {
            Disambiguation::Later => Ok(later),
            Disambiguation::Earlier => Ok(earlier),
            Disambiguation::Reject => Err(RelativeTimeError::SkippedLocalTime(format!(
                "{fields} does not exist in {zone}"
            ))),
        }
    }
}

// ── to_local / to_utc ───────────────────────────────────────────────────────

/// Express `instant` as wall-clock fields in `zone`, together with the
/// offset (minutes behind UTC) in force at that instant.
pub fn to_local(zone: &ZoneRef, instant: Instant) -> Result<(LocalFields, i32)> {
    let offset = zone.offset_minutes(instant)?;
    let local = instant.offset_by(-minutes_to_millis(offset))?;
    Ok((LocalFields::from_local_millis(local.as_millis())?, offset))
}

/// Resolve wall-clock `fields` in `zone` to a UTC instant.
///
/// `hint` is the offset to try first; passing the offset the value had
/// before an edit keeps the edit on the same side of a DST transition.
///
/// # Errors
///
/// Returns [`RelativeTimeError::OutOfRange`] if the fields cannot be
/// composed, or the ambiguity errors when `policy` is
/// [`Disambiguation::Reject`].
///
/// # Examples
///
/// ```
/// use relative_time::{to_utc, Disambiguation, LocalFields, ZoneRef};
///
/// let la = ZoneRef::parse("America/Los_Angeles").unwrap();
/// // 01:30 happens twice on 2016-11-06; the later one is 09:30 UTC.
/// let fields = LocalFields::new(2016, 11, 6, 1, 30, 0);
/// let instant = to_utc(&la, &fields, None, Disambiguation::Later).unwrap();
/// assert_eq!(instant.to_string(), "2016-11-06T09:30:00.000Z");
/// ```
pub fn to_utc(
    zone: &ZoneRef,
    fields: &LocalFields,
    hint: Option<i32>,
    policy: Disambiguation,
) -> Result<Instant> {
    let local = fields.to_local_millis()?;

    let resolved = match settle(zone, local, hint)? {
        Settled::Converged(candidate) if hint.is_some() => candidate,
        Settled::Converged(candidate) => {
            let points = fixed_points(zone, local, candidate)?;
            match (points.first(), points.last()) {
                (Some(&earlier), Some(&later)) if earlier != later => {
                    trace!(%fields, %zone, earlier, later, "repeated local time");
                    policy.repeated(earlier, later, fields, zone)?
                }
                _ => candidate,
            }
        }
        Settled::Oscillating { earlier, later } => {
            trace!(%fields, %zone, earlier, later, "skipped local time");
            policy.skipped(earlier, later, fields, zone)?
        }
        Settled::Unsettled(candidate) => {
            trace!(%fields, %zone, candidate, "offset iteration did not settle");
            candidate
        }
    };

    Ok(Instant::from_millis(resolved))
}

/// Outcome of the fixed-point iteration, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Converged(i64),
    Oscillating { earlier: i64, later: i64 },
    Unsettled(i64),
}

fn settle(zone: &ZoneRef, local: i64, hint: Option<i32>) -> Result<Settled> {
    let offset = match hint {
        Some(offset) => offset,
        None => zone.offset_minutes(Instant::from_millis(local))?,
    };

    let mut current = shifted(local, offset)?;
    let mut previous: Option<i64> = None;

    for _ in 0..MAX_ITERATIONS {
        let next_offset = zone.offset_minutes(Instant::from_millis(current))?;
        let candidate = shifted(local, next_offset)?;

        if candidate == current {
            return Ok(Settled::Converged(candidate));
        }
        if previous == Some(candidate) {
            return Ok(Settled::Oscillating {
                earlier: candidate.min(current),
                later: candidate.max(current),
            });
        }

        previous = Some(current);
        current = candidate;
    }

    Ok(Settled::Unsettled(current))
}

/// Every instant that `local` maps to, given one known solution `found`.
///
/// Offsets a day either side of `found` are tried as alternatives; each one
/// that reproduces itself is another reading of the same wall-clock time.
/// The result is sorted and contains `found`.
fn fixed_points(zone: &ZoneRef, local: i64, found: i64) -> Result<Vec<i64>> {
    let found_offset = zone.offset_minutes(Instant::from_millis(found))?;
    let mut points = vec![found];

    for probe in [found - MS_PER_DAY, found + MS_PER_DAY] {
        let alternate = zone.offset_minutes(Instant::from_millis(probe))?;
        if alternate == found_offset {
            continue;
        }
        let candidate = shifted(local, alternate)?;
        if points.contains(&candidate) {
            continue;
        }
        if zone.offset_minutes(Instant::from_millis(candidate))? == alternate {
            points.push(candidate);
        }
    }

    points.sort_unstable();
    Ok(points)
}

fn shifted(local: i64, offset_minutes: i32) -> Result<i64> {
    local
        .checked_add(minutes_to_millis(offset_minutes))
        .ok_or_else(|| RelativeTimeError::OutOfRange(format!("local timestamp {local} ms")))
}

pub(crate) fn minutes_to_millis(minutes: i32) -> i64 {
    i64::from(minutes) * MS_PER_MINUTE
}
