//! Time-ordered series of censored observations

use crate::censored::{apply_hicensor, parse_values, CensoredValue, RawValue};
use crate::time::{TimeKind, Timestamp};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One timed observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: Timestamp,
    pub value: CensoredValue,
}

impl Observation {
    pub fn new(time: impl Into<Timestamp>, value: CensoredValue) -> Self {
        Self {
            time: time.into(),
            value,
        }
    }
}

/// Observations sorted by time
///
/// Sorting is stable, so observations sharing a timestamp keep their input
/// order. Duplicate timestamps are allowed; aggregation is how a caller
/// collapses them. Every timestamp has the same [`TimeKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    kind: TimeKind,
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations of a single time kind
    pub fn from_observations(kind: TimeKind, mut observations: Vec<Observation>) -> Result<Self> {
        for obs in &observations {
            if obs.time.kind() != kind {
                return Err(Error::InvalidInput(format!(
                    "{} timestamp in a {kind} series",
                    obs.time.kind()
                )));
            }
            if let Timestamp::Numeric(t) = obs.time {
                if !t.is_finite() {
                    return Err(Error::non_finite("time axis"));
                }
            }
        }
        observations.sort_by(|a, b| a.time.axis_value().total_cmp(&b.time.axis_value()));
        Ok(Self { kind, observations })
    }

    /// Pair timestamps with values
    pub fn new(kind: TimeKind, times: &[Timestamp], values: &[CensoredValue]) -> Result<Self> {
        if times.len() != values.len() {
            return Err(Error::size_mismatch(values.len(), times.len(), "time axis"));
        }
        let observations = times
            .iter()
            .zip(values)
            .map(|(&time, &value)| Observation { time, value })
            .collect();
        Self::from_observations(kind, observations)
    }

    /// Series on a numeric time axis
    pub fn numeric(times: &[f64], values: &[CensoredValue]) -> Result<Self> {
        let times: Vec<Timestamp> = times.iter().map(|&t| Timestamp::Numeric(t)).collect();
        Self::new(TimeKind::Numeric, &times, values)
    }

    /// Series on a calendar time axis
    pub fn calendar(times: &[NaiveDateTime], values: &[CensoredValue]) -> Result<Self> {
        let times: Vec<Timestamp> = times.iter().map(|&t| Timestamp::Calendar(t)).collect();
        Self::new(TimeKind::Calendar, &times, values)
    }

    /// Parse mixed numeric/marker values against numeric times
    pub fn parse_numeric(times: &[f64], raw: &[RawValue]) -> Result<Self> {
        Self::numeric(times, &parse_values(raw)?)
    }

    /// Parse mixed numeric/marker values against calendar times
    pub fn parse_calendar(times: &[NaiveDateTime], raw: &[RawValue]) -> Result<Self> {
        Self::calendar(times, &parse_values(raw)?)
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn times(&self) -> Vec<Timestamp> {
        self.observations.iter().map(|o| o.time).collect()
    }

    /// Timestamps on the internal numeric axis
    pub fn axis(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.time.axis_value()).collect()
    }

    pub fn values(&self) -> Vec<CensoredValue> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first_time(&self) -> Option<Timestamp> {
        self.observations.first().map(|o| o.time)
    }

    pub fn last_time(&self) -> Option<Timestamp> {
        self.observations.last().map(|o| o.time)
    }

    /// Number of distinct timestamps
    pub fn distinct_times(&self) -> usize {
        let axis = self.axis();
        if axis.is_empty() {
            return 0;
        }
        1 + axis.windows(2).filter(|w| w[1] != w[0]).count()
    }

    /// Observations matching a predicate, same time kind
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Observation) -> bool,
    {
        Self {
            kind: self.kind,
            observations: self.observations.iter().filter(|o| keep(o)).copied().collect(),
        }
    }

    /// Observations with `start <= t < end`
    pub fn between(&self, start: Timestamp, end: Timestamp) -> Self {
        let (lo, hi) = (start.axis_value(), end.axis_value());
        self.filter(|o| {
            let t = o.time.axis_value();
            t >= lo && t < hi
        })
    }

    /// Copy of this series with the hi-censor rule applied
    pub fn hicensored(&self) -> Self {
        let values = apply_hicensor(&self.values());
        Self {
            kind: self.kind,
            observations: self
                .observations
                .iter()
                .zip(values)
                .map(|(o, value)| Observation { time: o.time, value })
                .collect(),
        }
    }
}
