//! Calendar offsets and aggregation periods
//!
//! Translates named units and offsets (`"year"`, `"6 months"`, `"30D"`) into
//! concrete steps and buckets on a series' time axis. Month and year offsets
//! follow the calendar (a year from 29 Feb lands on 28 Feb); shorter units
//! are fixed durations.

use crate::time::{TimeKind, TimeUnit, Timestamp};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A whole number of time units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarOffset {
    count: u32,
    unit: TimeUnit,
}

impl CalendarOffset {
    pub fn new(count: u32, unit: TimeUnit) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidOffset(format!("zero-length offset of {unit}s")));
        }
        let offset = Self { count, unit };
        offset.calendar_months()?;
        i32::try_from(count).map_err(|_| offset.too_long())?;
        Ok(offset)
    }

    pub fn years(count: u32) -> Result<Self> {
        Self::new(count, TimeUnit::Year)
    }

    pub fn months(count: u32) -> Result<Self> {
        Self::new(count, TimeUnit::Month)
    }

    pub fn days(count: u32) -> Result<Self> {
        Self::new(count, TimeUnit::Day)
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// `k` consecutive copies of this offset
    pub fn multiple(&self, k: u32) -> Result<Self> {
        let count = self.count.checked_mul(k).ok_or_else(|| self.too_long())?;
        Self::new(count, self.unit)
    }

    fn too_long(&self) -> Error {
        Error::InvalidOffset(format!("{} {}s is too long", self.count, self.unit))
    }

    /// Whole months for calendar units, `None` for fixed-length units
    fn calendar_months(&self) -> Result<Option<u32>> {
        match self.unit {
            TimeUnit::Month => Ok(Some(self.count)),
            TimeUnit::Year => self.count.checked_mul(12).map(Some).ok_or_else(|| self.too_long()),
            _ => Ok(None),
        }
    }

    fn fixed_seconds(&self) -> i64 {
        self.unit.seconds() as i64 * i64::from(self.count)
    }

    /// Nominal length in seconds (mean Gregorian lengths for months/years)
    pub fn approx_seconds(&self) -> f64 {
        self.unit.seconds() * f64::from(self.count)
    }

    /// Shift a timestamp forward by this offset
    pub fn add_to(&self, dt: NaiveDateTime) -> Result<NaiveDateTime> {
        let shifted = match self.calendar_months()? {
            Some(months) => dt.checked_add_months(Months::new(months)),
            None => TimeDelta::try_seconds(self.fixed_seconds())
                .and_then(|delta| dt.checked_add_signed(delta)),
        };
        shifted.ok_or_else(|| Error::InvalidOffset(format!("{dt} + {self} is out of range")))
    }

    /// Start of the bucket containing `dt`
    ///
    /// Year buckets start on 1 January of a year divisible by the count,
    /// month buckets on the first of a month whose index since year 0 is
    /// divisible by the count, fixed-length buckets on multiples of the
    /// duration since the Unix epoch.
    pub fn bucket_start(&self, dt: NaiveDateTime) -> Result<NaiveDateTime> {
        let out_of_range = || Error::InvalidOffset(format!("cannot bucket {dt} by {self}"));
        match self.unit {
            TimeUnit::Year => {
                let count = i32::try_from(self.count).map_err(|_| out_of_range())?;
                let year = dt.year().div_euclid(count) * count;
                NaiveDate::from_ymd_opt(year, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .ok_or_else(out_of_range)
            }
            TimeUnit::Month => {
                let count = self.count as i64;
                let index = i64::from(dt.year()) * 12 + i64::from(dt.month0());
                let start = index.div_euclid(count) * count;
                let year = i32::try_from(start.div_euclid(12)).map_err(|_| out_of_range())?;
                let month = start.rem_euclid(12) as u32 + 1;
                NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .ok_or_else(out_of_range)
            }
            _ => {
                let width = self.fixed_seconds();
                let secs = dt.and_utc().timestamp();
                let start = secs.div_euclid(width) * width;
                DateTime::from_timestamp(start, 0)
                    .map(|d| d.naive_utc())
                    .ok_or_else(out_of_range)
            }
        }
    }
}

impl fmt::Display for CalendarOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.count, self.unit)
        }
    }
}

impl FromStr for CalendarOffset {
    type Err = Error;

    /// Parse `"year"`, `"1 year"`, `"6 months"`, `"30D"`, `"2Y"`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(digits_end);

        let count = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| Error::InvalidOffset(format!("bad count in {s:?}")))?
        };
        let unit = unit.trim();
        if unit.is_empty() {
            return Err(Error::InvalidOffset(format!("missing unit in {s:?}")));
        }
        let unit: TimeUnit = unit
            .parse()
            .map_err(|_| Error::InvalidOffset(format!("unknown unit in {s:?}")))?;
        Self::new(count, unit)
    }
}

/// Width of an aggregation bucket or a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Period {
    /// Fixed width on a numeric time axis
    Span(f64),
    /// Calendar offset on a calendar time axis
    Offset(CalendarOffset),
}

impl Period {
    pub fn span(width: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "period width must be positive and finite, got {width}"
            )));
        }
        Ok(Self::Span(width))
    }

    /// Time kind this period applies to
    pub fn kind(&self) -> TimeKind {
        match self {
            Self::Span(_) => TimeKind::Numeric,
            Self::Offset(_) => TimeKind::Calendar,
        }
    }

    fn kind_error(&self, kind: TimeKind) -> Error {
        Error::InvalidParameter(format!(
            "{} period cannot be applied to a {kind} time axis",
            self.kind()
        ))
    }

    /// Reject a period applied to the wrong kind of time axis
    pub fn check_kind(&self, kind: TimeKind) -> Result<()> {
        if self.kind() != kind {
            return Err(self.kind_error(kind));
        }
        Ok(())
    }

    /// Timestamp one period after `t`
    pub fn advance(&self, t: Timestamp) -> Result<Timestamp> {
        match (self, t) {
            (Self::Span(w), Timestamp::Numeric(v)) => Ok(Timestamp::Numeric(v + w)),
            (Self::Offset(o), Timestamp::Calendar(dt)) => Ok(Timestamp::Calendar(o.add_to(dt)?)),
            _ => Err(self.kind_error(t.kind())),
        }
    }

    /// Timestamp `k` periods after `t`, measured from `t` rather than chained
    pub fn advance_by(&self, t: Timestamp, k: u32) -> Result<Timestamp> {
        match (self, t) {
            (Self::Span(w), Timestamp::Numeric(v)) => Ok(Timestamp::Numeric(v + w * f64::from(k))),
            (Self::Offset(o), Timestamp::Calendar(dt)) => {
                Ok(Timestamp::Calendar(o.multiple(k)?.add_to(dt)?))
            }
            _ => Err(self.kind_error(t.kind())),
        }
    }

    /// Half-open bucket `[start, end)` containing `t`
    pub fn bucket(&self, t: Timestamp) -> Result<(Timestamp, Timestamp)> {
        let start = match (self, t) {
            (Self::Span(w), Timestamp::Numeric(v)) => Timestamp::Numeric((v / w).floor() * w),
            (Self::Offset(o), Timestamp::Calendar(dt)) => Timestamp::Calendar(o.bucket_start(dt)?),
            _ => return Err(self.kind_error(t.kind())),
        };
        Ok((start, self.advance(start)?))
    }
}

impl From<CalendarOffset> for Period {
    fn from(offset: CalendarOffset) -> Self {
        Self::Offset(offset)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Span(w) => write!(f, "{w}"),
            Self::Offset(o) => write!(f, "{o}"),
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    /// A bare number is a numeric span, anything else a calendar offset
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<f64>() {
            Ok(width) => Self::span(width),
            Err(_) => Ok(Self::Offset(s.parse()?)),
        }
    }
}
