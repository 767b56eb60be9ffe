//! Error types for relative-time operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelativeTimeError {
    #[error("Unsupported {role} input: {reason}")]
    UnsupportedInput { role: &'static str, reason: String },

    #[error("Zone mismatch: target is in {target}, now is in {now}")]
    ZoneMismatch { target: String, now: String },

    #[error("Missing zone context: {0}")]
    MissingZoneContext(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid zone table: {0}")]
    InvalidZoneTable(String),

    #[error("Ambiguous local time: {0}")]
    AmbiguousLocalTime(String),

    #[error("Skipped local time: {0}")]
    SkippedLocalTime(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

pub type Result<T> = std::result::Result<T, RelativeTimeError>;
