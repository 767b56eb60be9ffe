//! # relative-time
//!
//! Calendar-aware relative time phrases ("yesterday", "in 3 days",
//! "2,412 hours ago") computed from two timestamps in a shared zone.
//!
//! Differences are measured on the wall clock of the working zone, so a
//! target late last night reads "yesterday" even when fewer than 24 hours
//! have passed, and a DST transition never shifts a day or hour count.
//!
//! ## Modules
//!
//! - [`relative_time`] — Entry point: zone resolution, unit selection, rendering
//! - [`difference`] — Lazily memoized per-unit differences between two zoned timestamps
//! - [`unit`] — Reporting units, thresholds, and the best-fit selector
//! - [`formatter`] — Pluggable phrase rendering with an English default
//! - [`zoned`] — A UTC instant viewed in a zone, with local getters and setters
//! - [`convert`] — Local ↔ UTC conversion with DST disambiguation
//! - [`zone`] — Named, fixed-offset and table-driven zones
//! - [`instant`] — Millisecond UTC instants
//! - [`error`] — Error types

pub mod convert;
pub mod difference;
pub mod error;
pub mod formatter;
pub mod instant;
pub mod relative_time;
pub mod unit;
pub mod zone;
pub mod zoned;

pub use convert::{days_in_month, to_local, to_utc, Disambiguation, LocalFields};
pub use difference::{DifferenceSet, Differences};
pub use error::RelativeTimeError;
pub use formatter::{EnglishFormatter, UnitFormatter};
pub use instant::Instant;
pub use relative_time::{
    FormatOptions, RelativeTime, RelativeTimeConfig, RelativeTimeResult, TemporalInput,
    ZonePolicy,
};
pub use unit::{best_fit, best_fit_from, Thresholds, Unit, UnitOption, THRESHOLDS};
pub use zone::{OffsetEntry, OffsetTable, ZoneRef};
pub use zoned::ZonedTimestamp;
