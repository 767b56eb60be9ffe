//! The public entry point: describe a target relative to "now".
//!
//! [`RelativeTime::format`] resolves the working zone, brings `target` and
//! `now` into it, computes a [`DifferenceSet`], picks a unit (explicit or
//! best-fit) and hands the signed count to the injected [`UnitFormatter`].
//!
//! # Zone resolution
//!
//! | target        | working zone                                              |
//! |---------------|-----------------------------------------------------------|
//! | `Zoned`       | the target's own zone                                     |
//! | `Instant`     | `options.time_zone`, else a zoned `now`'s zone, else error |
//! | `EpochMillis` | `options.time_zone`, else a zoned `now`'s zone, else the configured default zone |
//! | `Plain`       | `options.time_zone`, else the configured default zone; `now` must be `Plain` too |
//!
//! Plain datetimes are read as wall-clock times in the working zone, so a
//! repeated or skipped time is settled by
//! [`RelativeTimeConfig::disambiguation`]. With the default UTC zone this is
//! pure calendar arithmetic.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::convert::{Disambiguation, LocalFields};
use crate::difference::DifferenceSet;
use crate::error::{RelativeTimeError, Result};
use crate::formatter::{EnglishFormatter, UnitFormatter};
use crate::instant::Instant;
use crate::unit::{best_fit, Unit, UnitOption};
use crate::zone::ZoneRef;
use crate::zoned::ZonedTimestamp;

// ── inputs ──────────────────────────────────────────────────────────────────

/// Anything a target or a "now" can be given as.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalInput {
    /// Milliseconds since the epoch with no zone attached; viewed in the
    /// configured default zone unless the call supplies one.
    EpochMillis(i64),
    /// An absolute point that needs a zone from the call to be usable.
    Instant(Instant),
    /// An absolute point with its own zone.
    Zoned(ZonedTimestamp),
    /// Wall-clock fields with no UTC anchor.
    Plain(LocalFields),
}

impl TemporalInput {
    fn kind(&self) -> &'static str {
        match self {
            TemporalInput::EpochMillis(_) => "epoch milliseconds",
            TemporalInput::Instant(_) => "instant",
            TemporalInput::Zoned(_) => "zoned datetime",
            TemporalInput::Plain(_) => "plain datetime",
        }
    }

    fn zone(&self) -> Option<&ZoneRef> {
        match self {
            TemporalInput::Zoned(ts) => Some(ts.zone()),
            _ => None,
        }
    }
}

impl From<i64> for TemporalInput {
    fn from(millis: i64) -> Self {
        TemporalInput::EpochMillis(millis)
    }
}

impl From<Instant> for TemporalInput {
    fn from(instant: Instant) -> Self {
        TemporalInput::Instant(instant)
    }
}

impl From<DateTime<Utc>> for TemporalInput {
    fn from(dt: DateTime<Utc>) -> Self {
        TemporalInput::Instant(dt.into())
    }
}

impl From<ZonedTimestamp> for TemporalInput {
    fn from(ts: ZonedTimestamp) -> Self {
        TemporalInput::Zoned(ts)
    }
}

impl From<DateTime<Tz>> for TemporalInput {
    fn from(dt: DateTime<Tz>) -> Self {
        TemporalInput::Zoned(dt.into())
    }
}

impl From<LocalFields> for TemporalInput {
    fn from(fields: LocalFields) -> Self {
        TemporalInput::Plain(fields)
    }
}

impl From<NaiveDateTime> for TemporalInput {
    fn from(naive: NaiveDateTime) -> Self {
        TemporalInput::Plain(naive.into())
    }
}

// ── configuration ───────────────────────────────────────────────────────────

/// What to do when a zoned `now` is in a different zone from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZonePolicy {
    /// View `now` in the target's zone.
    #[default]
    Convert,
    /// Fail with [`RelativeTimeError::ZoneMismatch`].
    Strict,
}

/// Settings fixed for the lifetime of a [`RelativeTime`].
#[derive(Debug, Clone, Default)]
pub struct RelativeTimeConfig {
    /// Zone for bare epoch-millisecond and plain inputs when the call
    /// supplies none.
    pub default_zone: ZoneRef,
    /// Resolution of plain datetimes that fall on a repeated or skipped
    /// wall-clock time in the working zone.
    pub disambiguation: Disambiguation,
    pub zone_policy: ZonePolicy,
    /// See [`DifferenceSet::with_past_hour_correction`].
    pub past_hour_correction: bool,
}

/// Per-call options for [`RelativeTime::format`].
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Reference point; the system clock when omitted.
    pub now: Option<TemporalInput>,
    pub unit: UnitOption,
    /// Zone for zone-less targets. Ignored when the target carries its own.
    pub time_zone: Option<ZoneRef>,
}

impl FormatOptions {
    pub fn now(mut self, now: impl Into<TemporalInput>) -> Self {
        self.now = Some(now.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<UnitOption>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn time_zone(mut self, zone: ZoneRef) -> Self {
        self.time_zone = Some(zone);
        self
    }
}

/// The outcome of [`RelativeTime::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeTimeResult {
    pub unit: Unit,
    pub value: i64,
    pub text: String,
}

// ── RelativeTime ────────────────────────────────────────────────────────────

/// Formats targets relative to a reference "now".
///
/// # Examples
///
/// ```
/// use relative_time::{FormatOptions, LocalFields, RelativeTime, Unit};
///
/// let relative = RelativeTime::new();
/// let now = LocalFields::new(2016, 4, 10, 12, 0, 0);
///
/// let options = FormatOptions::default().now(now);
/// let target = LocalFields::new(2016, 3, 31, 23, 59, 0);
/// assert_eq!(relative.format(target, &options).unwrap(), "last month");
///
/// let options = options.unit(Unit::Day);
/// assert_eq!(relative.format(target, &options).unwrap(), "10 days ago");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RelativeTime<F = EnglishFormatter> {
    formatter: F,
    config: RelativeTimeConfig,
}

impl RelativeTime<EnglishFormatter> {
    pub fn new() -> Self {
        RelativeTime::default()
    }

    pub fn with_config(config: RelativeTimeConfig) -> Self {
        RelativeTime::with_formatter(EnglishFormatter, config)
    }
}

impl<F: UnitFormatter> RelativeTime<F> {
    pub fn with_formatter(formatter: F, config: RelativeTimeConfig) -> Self {
        RelativeTime { formatter, config }
    }

    pub fn config(&self) -> &RelativeTimeConfig {
        &self.config
    }

    /// Render `target` relative to `options.now`.
    ///
    /// # Errors
    ///
    /// - [`RelativeTimeError::UnsupportedInput`] when `target` and `now`
    ///   cannot be compared (a plain datetime against an anchored one).
    /// - [`RelativeTimeError::MissingZoneContext`] for an instant target
    ///   with no zone in the options or on `now`.
    /// - [`RelativeTimeError::ZoneMismatch`] under [`ZonePolicy::Strict`].
    pub fn format(
        &self,
        target: impl Into<TemporalInput>,
        options: &FormatOptions,
    ) -> Result<String> {
        self.describe(target, options).map(|result| result.text)
    }

    /// Like [`format`](Self::format), also reporting the unit and count.
    pub fn describe(
        &self,
        target: impl Into<TemporalInput>,
        options: &FormatOptions,
    ) -> Result<RelativeTimeResult> {
        let diff = self.difference(target.into(), options)?;

        let unit = match options.unit {
            UnitOption::Unit(unit) => unit,
            UnitOption::BestFit => best_fit(|unit| diff.get(unit))?,
        };
        let value = diff.get(unit)?;
        debug!(%unit, value, zone = %diff.target().zone(), "relative time resolved");

        Ok(RelativeTimeResult {
            unit,
            value,
            text: self.formatter.format(unit, value),
        })
    }

    /// Bring `target` and `now` into one zone and build their difference set.
    pub fn difference(
        &self,
        target: TemporalInput,
        options: &FormatOptions,
    ) -> Result<DifferenceSet> {
        let (now, target) = match target {
            TemporalInput::Plain(fields) => self.plain_pair(fields, options)?,
            anchored => self.anchored_pair(anchored, options)?,
        };
        let diff = DifferenceSet::new(now, target)?;
        Ok(diff.with_past_hour_correction(self.config.past_hour_correction))
    }

    fn anchored_pair(
        &self,
        target: TemporalInput,
        options: &FormatOptions,
    ) -> Result<(ZonedTimestamp, ZonedTimestamp)> {
        let now_zone = options.now.as_ref().and_then(TemporalInput::zone);

        let target = match target {
            TemporalInput::Zoned(ts) => ts,
            TemporalInput::Instant(instant) => {
                let zone = options.time_zone.as_ref().or(now_zone).ok_or_else(|| {
                    RelativeTimeError::MissingZoneContext(
                        "an instant target needs a time_zone option or a zoned now".to_string(),
                    )
                })?;
                ZonedTimestamp::new(instant, zone.clone())
            }
            TemporalInput::EpochMillis(millis) => {
                let zone = options
                    .time_zone
                    .as_ref()
                    .or(now_zone)
                    .unwrap_or(&self.config.default_zone);
                ZonedTimestamp::from_millis(millis, zone.clone())
            }
            TemporalInput::Plain(_) => {
                return Err(RelativeTimeError::UnsupportedInput {
                    role: "target",
                    reason: "plain datetimes are compared without zones".to_string(),
                })
            }
        };
        let zone = target.zone().clone();
        debug!(%zone, "working zone");

        let now = match &options.now {
            None => ZonedTimestamp::new(Instant::now(), zone),
            Some(TemporalInput::EpochMillis(millis)) => ZonedTimestamp::from_millis(*millis, zone),
            Some(TemporalInput::Instant(instant)) => ZonedTimestamp::new(*instant, zone),
            Some(TemporalInput::Zoned(now)) if now.zone() == &zone => now.clone(),
            Some(TemporalInput::Zoned(now)) => match self.config.zone_policy {
                ZonePolicy::Convert => now.with_zone(zone),
                ZonePolicy::Strict => {
                    return Err(RelativeTimeError::ZoneMismatch {
                        target: zone.to_string(),
                        now: now.zone().to_string(),
                    })
                }
            },
            Some(other @ TemporalInput::Plain(_)) => {
                return Err(RelativeTimeError::UnsupportedInput {
                    role: "now",
                    reason: format!("a {} cannot be compared with an anchored target", other.kind()),
                })
            }
        };

        Ok((now, target))
    }

    fn plain_pair(
        &self,
        target: LocalFields,
        options: &FormatOptions,
    ) -> Result<(ZonedTimestamp, ZonedTimestamp)> {
        let zone = options
            .time_zone
            .as_ref()
            .unwrap_or(&self.config.default_zone);
        debug!(%zone, "working zone for plain datetimes");

        let anchor = |fields: &LocalFields| {
            ZonedTimestamp::from_local(fields, zone.clone(), self.config.disambiguation)
        };
        let now = match &options.now {
            Some(TemporalInput::Plain(fields)) => anchor(fields)?,
            None => ZonedTimestamp::new(Instant::now(), zone.clone()),
            Some(other) => {
                return Err(RelativeTimeError::UnsupportedInput {
                    role: "now",
                    reason: format!("a plain target needs a plain now, got a {}", other.kind()),
                })
            }
        };
        Ok((now, anchor(&target)?))
    }
}
