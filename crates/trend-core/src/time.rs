//! Time axis types
//!
//! A series is timed either by opaque numbers (sample index, decimal year,
//! days since some origin) or by calendar timestamps. Slopes are always
//! computed on a plain `f64` axis: numeric timestamps are used as-is and
//! calendar timestamps become seconds since the Unix epoch.

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which kind of timestamps a series carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    Numeric,
    Calendar,
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

/// A single point on the time axis
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Timestamp {
    Numeric(f64),
    Calendar(NaiveDateTime),
}

impl Timestamp {
    pub fn kind(&self) -> TimeKind {
        match self {
            Self::Numeric(_) => TimeKind::Numeric,
            Self::Calendar(_) => TimeKind::Calendar,
        }
    }

    /// Position on the internal numeric axis
    ///
    /// Calendar timestamps are measured in seconds since the Unix epoch.
    pub fn axis_value(&self) -> f64 {
        match self {
            Self::Numeric(t) => *t,
            Self::Calendar(dt) => {
                let utc = dt.and_utc();
                utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) * 1e-6
            }
        }
    }

    pub fn as_calendar(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Calendar(dt) => Some(*dt),
            Self::Numeric(_) => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Numeric(t) => Some(*t),
            Self::Calendar(_) => None,
        }
    }

    /// Point halfway between two timestamps of the same kind
    pub fn midpoint(&self, other: &Timestamp) -> Result<Timestamp> {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => Ok(Self::Numeric(a + (b - a) / 2.0)),
            (Self::Calendar(a), Self::Calendar(b)) => a
                .checked_add_signed((*b - *a) / 2)
                .map(Self::Calendar)
                .ok_or_else(|| Error::Computation(format!("midpoint of {a} and {b} out of range"))),
            _ => Err(Error::InvalidInput(format!(
                "cannot mix {} and {} timestamps",
                self.kind(),
                other.kind()
            ))),
        }
    }
}

impl From<f64> for Timestamp {
    fn from(t: f64) -> Self {
        Self::Numeric(t)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Calendar(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(t) => write!(f, "{t}"),
            Self::Calendar(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Physical time unit used to express slopes
///
/// Months and years are mean Gregorian lengths (365.25 days per year) so
/// that a slope per second converts to a slope per year without reference
/// to a particular calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Length of one unit in seconds
    pub fn seconds(&self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3_600.0,
            Self::Day => SECONDS_PER_DAY,
            Self::Week => 7.0 * SECONDS_PER_DAY,
            Self::Month => DAYS_PER_YEAR * SECONDS_PER_DAY / 12.0,
            Self::Year => DAYS_PER_YEAR * SECONDS_PER_DAY,
        }
    }

    /// Factor converting a rate per `self` into a rate per `target`
    pub fn rate_factor(&self, target: TimeUnit) -> f64 {
        if *self == target {
            1.0
        } else {
            target.seconds() / self.seconds()
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    /// Parse a unit name
    ///
    /// Single-letter aliases are case sensitive (`"M"` is month, `"min"`
    /// is minute); full names are not.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let unit = match s {
            "S" | "s" => Some(Self::Second),
            "H" | "h" => Some(Self::Hour),
            "D" | "d" => Some(Self::Day),
            "W" | "w" => Some(Self::Week),
            "M" => Some(Self::Month),
            "Y" | "y" | "A" => Some(Self::Year),
            _ => None,
        };
        if let Some(unit) = unit {
            return Ok(unit);
        }

        match s.to_ascii_lowercase().as_str() {
            "sec" | "secs" | "second" | "seconds" => Ok(Self::Second),
            "min" | "mins" | "minute" | "minutes" => Ok(Self::Minute),
            "hr" | "hrs" | "hour" | "hours" => Ok(Self::Hour),
            "day" | "days" => Ok(Self::Day),
            "wk" | "week" | "weeks" => Ok(Self::Week),
            "mo" | "mon" | "month" | "months" => Ok(Self::Month),
            "yr" | "yrs" | "year" | "years" => Ok(Self::Year),
            _ => Err(Error::InvalidOffset(format!("unknown time unit {s:?}"))),
        }
    }
}
