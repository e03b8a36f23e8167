//! Mann-Kendall trend test with Sen slope on a single series

use crate::aggregate::aggregate_series;
use crate::config::TrendConfig;
use crate::traits::{TrendTest, TrendTestProperties};
use crate::types::{TrendResult, TrendWarning};
use tracing::{debug, instrument};
use trend_core::{CensoredValue, Error, Result, TimeSeries, TimeUnit};
use trend_kendall::{mk_statistic, sen_intercept, sen_slopes, MannKendallStatistic, SenSlope};

/// Trend test on the whole series, with optional aggregation
#[derive(Debug, Clone, Default)]
pub struct MannKendallTest {
    config: TrendConfig,
}

impl MannKendallTest {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }
}

impl TrendTestProperties for MannKendallTest {
    fn test_name(&self) -> &'static str {
        "Mann-Kendall"
    }

    fn minimum_sample_size(&self) -> usize {
        self.config.min_size
    }
}

impl TrendTest for MannKendallTest {
    fn test(&self, series: &TimeSeries) -> Result<TrendResult> {
        trend_test(series, &self.config)
    }
}

/// Hi-censor and aggregate as configured
pub(crate) fn prepare(series: &TimeSeries, config: &TrendConfig) -> Result<TimeSeries> {
    let series = if config.hicensor {
        series.hicensored()
    } else {
        series.clone()
    };
    match config.agg_method {
        Some(method) => aggregate_series(&series, method, config.agg_period.as_ref()),
        None => Ok(series),
    }
}

/// Test a series for a monotonic trend
///
/// Fails with `InsufficientData` when fewer than two distinct timestamps
/// remain after aggregation. Small but testable samples succeed with an
/// indeterminate trend and a [`TrendWarning::SmallSample`].
///
/// # Examples
///
/// ```rust
/// use trend_analysis::{trend_test, TrendConfig};
/// use trend_core::{RawValue, TimeSeries};
/// use trend_kendall::TrendDirection;
///
/// let raw: Vec<RawValue> = vec![
///     "<1".into(), 1.5.into(), 2.0.into(), 2.2.into(), 3.1.into(), 3.0.into(), 4.2.into(),
/// ];
/// let times: Vec<f64> = (0..7).map(|i| i as f64).collect();
/// let series = TimeSeries::parse_numeric(&times, &raw).unwrap();
///
/// let result = trend_test(&series, &TrendConfig::default()).unwrap();
/// assert_eq!(result.trend, TrendDirection::Increasing);
/// assert!(result.slope > 0.0);
/// ```
#[instrument(skip(series, config), fields(n = series.len()))]
pub fn trend_test(series: &TimeSeries, config: &TrendConfig) -> Result<TrendResult> {
    config.validate()?;
    let (factor, unit) = config.slope_factor(series.kind())?;

    let series = prepare(series, config)?;
    let distinct = series.distinct_times();
    if distinct < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: distinct,
        });
    }

    let values = series.values();
    let axis = series.axis();
    let stat = mk_statistic(&values);
    let slopes = sen_slopes(&values, &axis, &config.multipliers)?;

    summarize(stat, slopes, (&values, &axis), (factor, unit), config)
}

/// Assemble a result from S, the pooled slopes and the points they came from
pub(crate) fn summarize(
    stat: MannKendallStatistic,
    slopes: Vec<f64>,
    points: (&[CensoredValue], &[f64]),
    scaling: (f64, Option<TimeUnit>),
    config: &TrendConfig,
) -> Result<TrendResult> {
    let decision = stat.evaluate(&config.test_parameters())?;
    let sen = SenSlope::from_slopes(slopes, stat.var_s, config.alpha)?;
    let intercept = sen_intercept(points.0, points.1, sen.slope);
    let (factor, slope_unit) = scaling;
    let scaled = sen.scaled(factor);

    let mut warnings = Vec::new();
    if stat.n < config.min_size {
        warnings.push(TrendWarning::SmallSample {
            n: stat.n,
            min: config.min_size,
        });
    }
    if stat.var_s == 0.0 {
        warnings.push(TrendWarning::ZeroVariance);
    }
    if sen.n_slopes == 0 {
        warnings.push(TrendWarning::NoSlopes);
    }
    if !warnings.is_empty() {
        debug!(?warnings, "trend result carries warnings");
    }

    Ok(TrendResult {
        s: stat.s,
        var_s: stat.var_s,
        p: decision.p,
        z: decision.z,
        h: decision.h,
        trend: decision.trend,
        tau: stat.tau(),
        confidence: decision.confidence,
        slope: sen.slope,
        intercept,
        lower_ci: sen.lower_ci,
        upper_ci: sen.upper_ci,
        scaled_slope: scaled.slope,
        scaled_lower_ci: scaled.lower_ci,
        scaled_upper_ci: scaled.upper_ci,
        slope_unit,
        n: stat.n,
        warnings,
    })
}
