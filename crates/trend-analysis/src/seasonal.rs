//! Seasonal Mann-Kendall test
//!
//! Each observation is assigned a season and a cycle (for monthly data: the
//! month and the year). Observations sharing both are aggregated to one
//! point, then S and varS are computed within each season and summed.
//! Seasons are never compared with each other. Sen slopes are pooled
//! across seasons before taking the median.

use crate::aggregate::{aggregate, median_time, AggregationMethod};
use crate::config::TrendConfig;
use crate::single::summarize;
use crate::traits::{TrendTest, TrendTestProperties};
use crate::types::TrendResult;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use trend_core::{CensoredValue, Error, Observation, Result, TimeSeries, Timestamp};
use trend_kendall::{mk_statistic, sen_slopes, MannKendallStatistic};

const SECONDS_PER_DAY: i64 = 86_400;

/// Seasons per cycle, validated against the time axis on use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seasonality {
    period: u32,
}

impl Seasonality {
    pub fn new(period: u32) -> Result<Self> {
        if period < 2 {
            return Err(Error::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        Ok(Self { period })
    }

    pub fn monthly() -> Self {
        Self { period: 12 }
    }

    pub fn quarterly() -> Self {
        Self { period: 4 }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// `(season, cycle)` of a timestamp
    ///
    /// Numeric axes use `floor(t) mod period` and `floor(t) div period`.
    /// Calendar axes support months (12), quarters (4), ISO weeks (52, week
    /// 53 folds into 52), weekdays (7) and hours (24).
    pub fn season_of(&self, t: &Timestamp) -> Result<(u32, i64)> {
        match t {
            Timestamp::Numeric(v) => {
                let whole = v.floor() as i64;
                let p = i64::from(self.period);
                Ok((whole.rem_euclid(p) as u32, whole.div_euclid(p)))
            }
            Timestamp::Calendar(dt) => self.calendar_season(dt),
        }
    }

    fn calendar_season(&self, dt: &NaiveDateTime) -> Result<(u32, i64)> {
        let days = dt.and_utc().timestamp().div_euclid(SECONDS_PER_DAY);
        match self.period {
            12 => Ok((dt.month0(), i64::from(dt.year()))),
            4 => Ok((dt.month0() / 3, i64::from(dt.year()))),
            52 => {
                let week = dt.iso_week();
                Ok((week.week0().min(51), i64::from(week.year())))
            }
            // 1970-01-01 was a Thursday; shift so cycles run Monday to Sunday
            7 => Ok((dt.weekday().num_days_from_monday(), (days + 3).div_euclid(7))),
            24 => Ok((dt.hour(), days)),
            other => Err(Error::InvalidParameter(format!(
                "seasonal period {other} is not supported on a calendar axis (use 4, 7, 12, 24 or 52)"
            ))),
        }
    }
}

/// Seasonal trend test with a fixed number of seasons
#[derive(Debug, Clone)]
pub struct SeasonalMannKendallTest {
    seasonality: Seasonality,
    config: TrendConfig,
}

impl SeasonalMannKendallTest {
    pub fn new(seasonality: Seasonality, config: TrendConfig) -> Self {
        Self {
            seasonality,
            config,
        }
    }

    pub fn seasonality(&self) -> Seasonality {
        self.seasonality
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }
}

impl TrendTestProperties for SeasonalMannKendallTest {
    fn test_name(&self) -> &'static str {
        "Seasonal Mann-Kendall"
    }

    fn minimum_sample_size(&self) -> usize {
        self.config.min_size
    }
}

impl TrendTest for SeasonalMannKendallTest {
    fn test(&self, series: &TimeSeries) -> Result<TrendResult> {
        seasonal_test_with(series, self.seasonality, &self.config)
    }
}

/// Seasonal trend test with `period` seasons per cycle
///
/// `agg_method` (default median) collapses observations sharing a season
/// and cycle; LWP variants use their base reduction. `agg_period` is not
/// used here.
#[instrument(skip(series, config), fields(n = series.len()))]
pub fn seasonal_trend_test(
    series: &TimeSeries,
    period: u32,
    config: &TrendConfig,
) -> Result<TrendResult> {
    seasonal_test_with(series, Seasonality::new(period)?, config)
}

fn seasonal_test_with(
    series: &TimeSeries,
    seasonality: Seasonality,
    config: &TrendConfig,
) -> Result<TrendResult> {
    config.validate()?;
    let scaling = config.slope_factor(series.kind())?;
    let method = config.agg_method.map(|m| m.base()).unwrap_or(AggregationMethod::Median);

    let series = if config.hicensor {
        series.hicensored()
    } else {
        series.clone()
    };

    let mut seasons: BTreeMap<u32, BTreeMap<i64, Vec<Observation>>> = BTreeMap::new();
    for obs in series.observations() {
        let (season, cycle) = seasonality.season_of(&obs.time)?;
        seasons
            .entry(season)
            .or_default()
            .entry(cycle)
            .or_default()
            .push(*obs);
    }

    let mut stats: Vec<MannKendallStatistic> = Vec::with_capacity(seasons.len());
    let mut slopes = Vec::new();
    let mut all_points: Vec<Observation> = Vec::new();

    for (season, cycles) in &seasons {
        let mut points = Vec::with_capacity(cycles.len());
        for members in cycles.values() {
            let values: Vec<CensoredValue> = members.iter().map(|o| o.value).collect();
            let times: Vec<Timestamp> = members.iter().map(|o| o.time).collect();
            points.push(Observation {
                time: median_time(&times)?,
                value: aggregate(&values, method)?,
            });
        }
        points.sort_by(|a, b| a.time.axis_value().total_cmp(&b.time.axis_value()));

        let values: Vec<CensoredValue> = points.iter().map(|o| o.value).collect();
        let axis: Vec<f64> = points.iter().map(|o| o.time.axis_value()).collect();
        let stat = mk_statistic(&values);
        debug!(season, points = points.len(), s = stat.s, var_s = stat.var_s, "season statistic");

        slopes.extend(sen_slopes(&values, &axis, &config.multipliers)?);
        stats.push(stat);
        all_points.extend(points);
    }

    if all_points.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: all_points.len(),
        });
    }

    all_points.sort_by(|a, b| a.time.axis_value().total_cmp(&b.time.axis_value()));
    let values: Vec<CensoredValue> = all_points.iter().map(|o| o.value).collect();
    let axis: Vec<f64> = all_points.iter().map(|o| o.time.axis_value()).collect();

    let combined = MannKendallStatistic::combine(stats);
    summarize(combined, slopes, (&values, &axis), scaling, config)
}
