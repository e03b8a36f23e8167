//! Reduction of observation groups to single censored values
//!
//! Trend tests assume one observation per time step. Aggregation collapses
//! duplicate timestamps, or every observation inside a period bucket, into
//! one representative value before S and the slopes are computed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};
use trend_core::utils::{mean, median};
use trend_core::{CensorType, CensoredValue, Error, Observation, Period, Result, TimeSeries, Timestamp};

/// Policy for collapsing a group of observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMethod {
    /// Arithmetic mean, majority censor flag
    Mean,
    /// Median value, majority censor flag
    Median,
    /// Median observation, preferring uncensored values at equal magnitude
    RobustMedian,
    /// Midrange `(min + max) / 2`, majority censor flag
    Middle,
    /// Median thinned to one point per period, placed mid-window
    LwpMedian,
    /// Robust median thinned to one point per period, placed mid-window
    LwpRobustMedian,
}

impl AggregationMethod {
    pub const ALL: [AggregationMethod; 6] = [
        Self::Mean,
        Self::Median,
        Self::RobustMedian,
        Self::Middle,
        Self::LwpMedian,
        Self::LwpRobustMedian,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::RobustMedian => "robust_median",
            Self::Middle => "middle",
            Self::LwpMedian => "lwp_median",
            Self::LwpRobustMedian => "lwp_robust_median",
        }
    }

    /// Thinning variants, which need a period
    pub fn is_lwp(&self) -> bool {
        matches!(self, Self::LwpMedian | Self::LwpRobustMedian)
    }

    /// The value reduction without the thinning placement
    pub fn base(&self) -> Self {
        match self {
            Self::LwpMedian => Self::Median,
            Self::LwpRobustMedian => Self::RobustMedian,
            other => *other,
        }
    }
}

impl Default for AggregationMethod {
    fn default() -> Self {
        Self::Median
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == key)
            .ok_or_else(|| Error::UnknownAggregation(s.to_string()))
    }
}

/// Most frequent censor flag; ties prefer uncensored, then `<`
fn majority_censor(group: &[CensoredValue]) -> CensorType {
    let count = |c: CensorType| group.iter().filter(|v| v.censor() == c).count();
    let mut best = CensorType::None;
    let mut best_count = count(CensorType::None);
    for candidate in [CensorType::LessThan, CensorType::GreaterThan] {
        let n = count(candidate);
        if n > best_count {
            best = candidate;
            best_count = n;
        }
    }
    best
}

fn censor_rank(c: CensorType) -> u8 {
    match c {
        CensorType::None => 0,
        CensorType::LessThan => 1,
        CensorType::GreaterThan => 2,
    }
}

/// Ascending by value; uncensored first at equal value
fn robust_order(a: &CensoredValue, b: &CensoredValue) -> Ordering {
    a.value()
        .total_cmp(&b.value())
        .then_with(|| censor_rank(a.censor()).cmp(&censor_rank(b.censor())))
}

fn robust_median(group: &[CensoredValue]) -> Result<CensoredValue> {
    let mut sorted = group.to_vec();
    sorted.sort_by(robust_order);
    let n = sorted.len();
    if n % 2 == 1 {
        return Ok(sorted[n / 2]);
    }

    let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
    if lo.value() == hi.value() {
        return Ok(lo);
    }
    let censor = match (lo.censor(), hi.censor()) {
        (a, b) if a == b => a,
        (CensorType::None, c) | (c, CensorType::None) => c,
        _ => CensorType::None,
    };
    CensoredValue::new((lo.value() + hi.value()) / 2.0, censor)
}

/// Collapse a group of censored values into one
pub fn aggregate(group: &[CensoredValue], method: AggregationMethod) -> Result<CensoredValue> {
    if group.is_empty() {
        return Err(Error::InsufficientData {
            expected: 1,
            actual: 0,
        });
    }
    if group.len() == 1 {
        return Ok(group[0]);
    }

    let xs: Vec<f64> = group.iter().map(|v| v.value()).collect();
    match method.base() {
        AggregationMethod::Mean => CensoredValue::new(mean(&xs), majority_censor(group)),
        AggregationMethod::Median => CensoredValue::new(median(&xs), majority_censor(group)),
        AggregationMethod::Middle => {
            let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            CensoredValue::new((lo + hi) / 2.0, majority_censor(group))
        }
        _ => robust_median(group),
    }
}

/// Median member time of a time-ordered group
pub(crate) fn median_time(times: &[Timestamp]) -> Result<Timestamp> {
    let n = times.len();
    if n == 0 {
        return Err(Error::InsufficientData {
            expected: 1,
            actual: 0,
        });
    }
    if n % 2 == 1 {
        Ok(times[n / 2])
    } else {
        times[n / 2 - 1].midpoint(&times[n / 2])
    }
}

struct Group {
    start: Timestamp,
    end: Option<Timestamp>,
    members: Vec<Observation>,
}

/// Aggregate a series by period bucket, or by identical timestamp when no
/// period is given
///
/// LWP methods emit exactly one point per non-empty window at the window
/// midpoint; the others place each group at its median member time.
#[instrument(skip(series), fields(n = series.len()))]
pub fn aggregate_series(
    series: &TimeSeries,
    method: AggregationMethod,
    period: Option<&Period>,
) -> Result<TimeSeries> {
    if method.is_lwp() && period.is_none() {
        return Err(Error::InvalidParameter(format!(
            "{method} aggregation requires a period"
        )));
    }
    if let Some(period) = period {
        period.check_kind(series.kind())?;
    }

    let mut groups: Vec<Group> = Vec::new();
    for obs in series.observations() {
        let (start, end) = match period {
            Some(p) => {
                let (start, end) = p.bucket(obs.time)?;
                (start, Some(end))
            }
            None => (obs.time, None),
        };
        match groups.last_mut() {
            Some(g) if g.start.axis_value() == start.axis_value() => g.members.push(*obs),
            _ => groups.push(Group {
                start,
                end,
                members: vec![*obs],
            }),
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for group in &groups {
        let values: Vec<CensoredValue> = group.members.iter().map(|o| o.value).collect();
        let value = aggregate(&values, method)?;
        let time = match (method.is_lwp(), group.end) {
            (true, Some(end)) => group.start.midpoint(&end)?,
            _ => {
                let times: Vec<Timestamp> = group.members.iter().map(|o| o.time).collect();
                median_time(&times)?
            }
        };
        out.push(Observation { time, value });
    }

    debug!(method = %method, groups = out.len(), "aggregated series");
    TimeSeries::from_observations(series.kind(), out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn x(v: f64) -> CensoredValue {
        CensoredValue::exact(v).unwrap()
    }

    fn lt(v: f64) -> CensoredValue {
        CensoredValue::less_than(v).unwrap()
    }

    fn gt(v: f64) -> CensoredValue {
        CensoredValue::greater_than(v).unwrap()
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in AggregationMethod::ALL {
            assert_eq!(method.name().parse::<AggregationMethod>().unwrap(), method);
        }
        assert_eq!(
            " LWP_Median ".parse::<AggregationMethod>().unwrap(),
            AggregationMethod::LwpMedian
        );
        assert!(matches!(
            "geometric".parse::<AggregationMethod>(),
            Err(Error::UnknownAggregation(name)) if name == "geometric"
        ));
    }

    #[test]
    fn test_mean_and_median_use_majority_flag() {
        let group = [lt(1.0), lt(1.0), x(4.0)];
        let mean = aggregate(&group, AggregationMethod::Mean).unwrap();
        assert_relative_eq!(mean.value(), 2.0);
        assert_eq!(mean.censor(), CensorType::LessThan);

        let median = aggregate(&group, AggregationMethod::Median).unwrap();
        assert_eq!(median, lt(1.0));
    }

    #[test]
    fn test_majority_tie_prefers_uncensored() {
        let group = [lt(1.0), x(3.0)];
        let median = aggregate(&group, AggregationMethod::Median).unwrap();
        assert_eq!(median, x(2.0));
        assert_eq!(majority_censor(&[lt(1.0), gt(2.0)]), CensorType::LessThan);
    }

    #[test]
    fn test_middle_is_midrange() {
        let group = [x(1.0), x(2.0), x(9.0)];
        assert_eq!(aggregate(&group, AggregationMethod::Middle).unwrap(), x(5.0));
    }

    #[test]
    fn test_robust_median_odd_keeps_observation() {
        let group = [x(5.0), lt(2.0), x(1.0)];
        assert_eq!(
            aggregate(&group, AggregationMethod::RobustMedian).unwrap(),
            lt(2.0)
        );
        // uncensored 2 sorts ahead of <2
        let group = [lt(2.0), x(2.0), x(2.0)];
        assert_eq!(
            aggregate(&group, AggregationMethod::RobustMedian).unwrap(),
            x(2.0)
        );
    }

    #[test]
    fn test_robust_median_even() {
        assert_eq!(
            aggregate(&[lt(2.0), x(2.0)], AggregationMethod::RobustMedian).unwrap(),
            x(2.0)
        );
        assert_eq!(
            aggregate(&[lt(1.0), x(3.0)], AggregationMethod::RobustMedian).unwrap(),
            lt(2.0)
        );
        assert_eq!(
            aggregate(&[lt(1.0), lt(3.0)], AggregationMethod::RobustMedian).unwrap(),
            lt(2.0)
        );
        assert_eq!(
            aggregate(&[lt(1.0), gt(3.0)], AggregationMethod::RobustMedian).unwrap(),
            x(2.0)
        );
    }

    #[test]
    fn test_lwp_variants_reduce_like_base() {
        let group = [x(1.0), lt(4.0), x(7.0), x(2.0)];
        assert_eq!(
            aggregate(&group, AggregationMethod::LwpMedian).unwrap(),
            aggregate(&group, AggregationMethod::Median).unwrap()
        );
        assert_eq!(
            aggregate(&group, AggregationMethod::LwpRobustMedian).unwrap(),
            aggregate(&group, AggregationMethod::RobustMedian).unwrap()
        );
    }

    #[test]
    fn test_empty_group_is_error() {
        assert!(aggregate(&[], AggregationMethod::Mean)
            .unwrap_err()
            .is_insufficient_data());
    }

    #[test]
    fn test_duplicate_timestamps_collapse() {
        let series =
            TimeSeries::numeric(&[0.0, 1.0, 1.0, 2.0], &[x(1.0), x(2.0), x(4.0), x(5.0)]).unwrap();
        let out = aggregate_series(&series, AggregationMethod::Mean, None).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.values()[1], x(3.0));
        assert_eq!(out.axis(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_numeric_lwp_thinning() {
        let times: Vec<f64> = (0..24).map(|i| i as f64).collect();
        let values: Vec<CensoredValue> = (0..24).map(|i| x(i as f64)).collect();
        let series = TimeSeries::numeric(&times, &values).unwrap();
        let period = Period::span(12.0).unwrap();

        let out = aggregate_series(&series, AggregationMethod::LwpMedian, Some(&period)).unwrap();
        assert_eq!(out.values(), vec![x(5.5), x(17.5)]);
        assert_eq!(out.axis(), vec![6.0, 18.0]);

        let plain = aggregate_series(&series, AggregationMethod::Median, Some(&period)).unwrap();
        assert_eq!(plain.axis(), vec![5.5, 17.5]);
    }

    #[test]
    fn test_lwp_requires_period() {
        let series = TimeSeries::numeric(&[0.0, 1.0], &[x(1.0), x(2.0)]).unwrap();
        assert!(matches!(
            aggregate_series(&series, AggregationMethod::LwpRobustMedian, None),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_period_kind_must_match_axis() {
        let series = TimeSeries::numeric(&[0.0, 1.0], &[x(1.0), x(2.0)]).unwrap();
        let yearly: Period = "1 year".parse().unwrap();
        assert!(aggregate_series(&series, AggregationMethod::Median, Some(&yearly)).is_err());
    }
}
