//! Zone references and the offset resolver.
//!
//! A [`ZoneRef`] maps any [`Instant`] to a UTC offset in minutes. Offsets use
//! the sign convention of the zone tables this crate consumes: the number of
//! minutes local time is *behind* UTC, so `local = utc - offset`. Los Angeles
//! in winter is `480`, Berlin in summer is `-120`.
//!
//! Three kinds of zone are supported:
//!
//! - [`ZoneRef::Named`] — an IANA identifier resolved through `chrono-tz`
//! - [`ZoneRef::Fixed`] — a constant offset (`UTC`, `GMT-07:00`, `+05:30`)
//! - [`ZoneRef::Table`] — a caller-supplied [`OffsetTable`]

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Offset, TimeZone};
use chrono_tz::Tz;

use crate::error::{RelativeTimeError, Result};
use crate::instant::Instant;

// ── OffsetTable ─────────────────────────────────────────────────────────────

/// One row of an [`OffsetTable`]: `offset_minutes` applies to every instant
/// strictly before `until`. The final row has no `until` and is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    pub until: Option<Instant>,
    pub offset_minutes: i32,
}

impl OffsetEntry {
    pub const fn until(until: Instant, offset_minutes: i32) -> Self {
        OffsetEntry {
            until: Some(until),
            offset_minutes,
        }
    }

    pub const fn open(offset_minutes: i32) -> Self {
        OffsetEntry {
            until: None,
            offset_minutes,
        }
    }
}

/// A pre-built table of historical offsets for a single zone.
///
/// The table is total: every instant resolves to the first entry whose
/// `until` exceeds it, or to the final open-ended entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    entries: Vec<OffsetEntry>,
}

impl OffsetTable {
    /// Build a table, rejecting structurally inconsistent input.
    ///
    /// # Errors
    ///
    /// Returns [`RelativeTimeError::InvalidZoneTable`] if the table is empty,
    /// if any entry but the last is open-ended, if the last entry is bounded,
    /// or if the `until` values are not strictly increasing.
    pub fn new(entries: Vec<OffsetEntry>) -> Result<Self> {
        let Some((last, bounded)) = entries.split_last() else {
            return Err(RelativeTimeError::InvalidZoneTable(
                "table has no entries".to_string(),
            ));
        };
        if last.until.is_some() {
            return Err(RelativeTimeError::InvalidZoneTable(
                "last entry must be open-ended".to_string(),
            ));
        }

        let mut previous: Option<Instant> = None;
        for (idx, entry) in bounded.iter().enumerate() {
            let until = entry.until.ok_or_else(|| {
                RelativeTimeError::InvalidZoneTable(format!(
                    "entry {idx} is open-ended but is not the last entry"
                ))
            })?;
            if previous.is_some_and(|p| p >= until) {
                return Err(RelativeTimeError::InvalidZoneTable(format!(
                    "entry {idx} ends at {until}, not after the previous entry"
                )));
            }
            previous = Some(until);
        }

        Ok(OffsetTable { entries })
    }

    /// Build a table from parallel `untils`/`offsets` arrays, the packed
    /// layout used by published zone data. `untils` holds one fewer element
    /// than `offsets`; the final offset is open-ended.
    pub fn from_parts(untils: &[i64], offsets: &[i32]) -> Result<Self> {
        if offsets.len() != untils.len() + 1 {
            return Err(RelativeTimeError::InvalidZoneTable(format!(
                "expected {} offsets for {} transitions, got {}",
                untils.len() + 1,
                untils.len(),
                offsets.len()
            )));
        }
        let entries = untils
            .iter()
            .map(|&until| Some(Instant::from_millis(until)))
            .chain(std::iter::once(None))
            .zip(offsets)
            .map(|(until, &offset_minutes)| OffsetEntry {
                until,
                offset_minutes,
            })
            .collect();
        OffsetTable::new(entries)
    }

    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }

    pub fn offset_minutes(&self, instant: Instant) -> i32 {
        let idx = self
            .entries
            .partition_point(|entry| entry.until.is_some_and(|until| until <= instant));
        // The last entry is open-ended, so `idx` never runs past it.
        self.entries[idx.min(self.entries.len() - 1)].offset_minutes
    }
}

// ── ZoneRef ─────────────────────────────────────────────────────────────────

/// A rule mapping instants to UTC offsets.
///
/// Cloning is cheap: tables are shared behind an [`Arc`] and never mutated.
/// Equality is structural: two references are equal when they name the same
/// zone, carry the same fixed offset, or hold equal tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRef {
    Named(Tz),
    /// Minutes local time is behind UTC.
    Fixed(i32),
    Table(Arc<OffsetTable>),
}

impl ZoneRef {
    pub const UTC: ZoneRef = ZoneRef::Fixed(0);

    /// Parse an IANA identifier or a fixed-offset designator.
    ///
    /// Accepted fixed forms: `UTC`, `GMT`, `Z`, `UTC+5`, `GMT-07:00`,
    /// `+05:30`, `-0800`.
    ///
    /// # Errors
    ///
    /// Returns [`RelativeTimeError::InvalidTimezone`] for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use relative_time::ZoneRef;
    ///
    /// assert_eq!(ZoneRef::parse("GMT-07:00").unwrap(), ZoneRef::Fixed(420));
    /// assert!(matches!(ZoneRef::parse("Europe/Berlin").unwrap(), ZoneRef::Named(_)));
    /// assert_eq!(ZoneRef::parse("Etc/UTC").unwrap(), ZoneRef::UTC);
    /// assert!(ZoneRef::parse("Mars/Olympus_Mons").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(offset) = parse_fixed_offset(s) {
            return Ok(ZoneRef::Fixed(offset));
        }
        s.parse::<Tz>()
            .map(ZoneRef::from)
            .map_err(|_| RelativeTimeError::InvalidTimezone(format!("'{s}'")))
    }

    pub fn table(table: OffsetTable) -> Self {
        ZoneRef::Table(Arc::new(table))
    }

    /// The zone's offset at `instant`, in minutes behind UTC.
    ///
    /// # Errors
    ///
    /// Returns [`RelativeTimeError::OutOfRange`] if a named zone is asked
    /// about an instant outside chrono's calendar range.
    pub fn offset_minutes(&self, instant: Instant) -> Result<i32> {
        match self {
            ZoneRef::Fixed(offset) => Ok(*offset),
            ZoneRef::Table(table) => Ok(table.offset_minutes(instant)),
            ZoneRef::Named(tz) => {
                let utc = instant.to_datetime()?.naive_utc();
                let east_seconds = tz.offset_from_utc_datetime(&utc).fix().local_minus_utc();
                Ok(-east_seconds / 60)
            }
        }
    }
}

impl Default for ZoneRef {
    fn default() -> Self {
        ZoneRef::UTC
    }
}

/// Zones that never change offset (`Etc/UTC`, `Etc/GMT+5`, `Zulu`) become
/// [`ZoneRef::Fixed`], so they compare equal to the same offset written out.
impl From<Tz> for ZoneRef {
    fn from(tz: Tz) -> Self {
        match fixed_alias(tz) {
            Some(offset) => ZoneRef::Fixed(offset),
            None => ZoneRef::Named(tz),
        }
    }
}

/// The constant offset of an `Etc/*` zone or one of the UTC/GMT aliases.
fn fixed_alias(tz: Tz) -> Option<i32> {
    let name = tz.name();
    let fixed = name.starts_with("Etc/")
        || matches!(
            name,
            "UTC" | "UCT" | "GMT" | "GMT0" | "GMT+0" | "GMT-0" | "Greenwich" | "Universal" | "Zulu"
        );
    if !fixed {
        return None;
    }
    ZoneRef::Named(tz).offset_minutes(Instant::UNIX_EPOCH).ok()
}

impl From<OffsetTable> for ZoneRef {
    fn from(table: OffsetTable) -> Self {
        ZoneRef::table(table)
    }
}

impl FromStr for ZoneRef {
    type Err = RelativeTimeError;

    fn from_str(s: &str) -> Result<Self> {
        ZoneRef::parse(s)
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Named(tz) => f.write_str(tz.name()),
            ZoneRef::Fixed(0) => f.write_str("UTC"),
            ZoneRef::Fixed(offset) => {
                // Displayed east-positive, the way people write offsets.
                let sign = if *offset > 0 { "-" } else { "+" };
                let abs = offset.unsigned_abs();
                write!(f, "UTC{sign}{:02}:{:02}", abs / 60, abs % 60)
            }
            ZoneRef::Table(table) => write!(f, "<offset table, {} entries>", table.entries.len()),
        }
    }
}

/// Parse `UTC`, `GMT`, `Z` and `[UTC|GMT]±H[H][[:]MM]` into minutes behind UTC.
fn parse_fixed_offset(s: &str) -> Option<i32> {
    let upper = s.to_ascii_uppercase();
    if matches!(upper.as_str(), "UTC" | "GMT" | "Z") {
        return Some(0);
    }

    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    let (sign, digits) = match rest.as_bytes().first() {
        Some(b'+') => (1, &rest[1..]),
        Some(b'-') => (-1, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return None,
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }

    Some(-sign * (hours * 60 + minutes))
}
