//! Configuration types for trend tests

use crate::aggregate::AggregationMethod;
use crate::rolling::RollingWindow;
use serde::{Deserialize, Serialize};
use trend_core::{Error, Period, Result, TimeKind, TimeUnit};
use trend_kendall::{CensorMultipliers, TestParameters};

/// Parameters shared by the single-series and seasonal tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Significance level
    pub alpha: f64,
    /// Continuity correction on S
    pub continuity: bool,
    /// Aggregation applied before testing
    pub agg_method: Option<AggregationMethod>,
    /// Bucket width for aggregation; `None` groups identical timestamps
    pub agg_period: Option<Period>,
    /// Report slopes per this unit
    pub slope_scaling: Option<TimeUnit>,
    /// Unit of a numeric time axis (calendar axes are in seconds)
    pub time_unit: Option<TimeUnit>,
    /// Damping of slopes involving censored values
    pub multipliers: CensorMultipliers,
    /// Below this many points the trend is indeterminate
    pub min_size: usize,
    /// Raise every value below the highest `<` limit to that limit
    pub hicensor: bool,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            continuity: true,
            agg_method: None,
            agg_period: None,
            slope_scaling: None,
            time_unit: None,
            multipliers: CensorMultipliers::default(),
            min_size: 5,
            hicensor: false,
        }
    }
}

impl TrendConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_continuity(mut self, continuity: bool) -> Self {
        self.continuity = continuity;
        self
    }

    pub fn with_agg_method(mut self, method: AggregationMethod) -> Self {
        self.agg_method = Some(method);
        self
    }

    pub fn with_agg_period(mut self, period: Period) -> Self {
        self.agg_period = Some(period);
        self
    }

    /// Aggregate with `method` over buckets of `period`
    pub fn with_aggregation(self, method: AggregationMethod, period: Period) -> Self {
        self.with_agg_method(method).with_agg_period(period)
    }

    pub fn with_slope_scaling(mut self, unit: TimeUnit) -> Self {
        self.slope_scaling = Some(unit);
        self
    }

    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = Some(unit);
        self
    }

    pub fn with_multipliers(mut self, multipliers: CensorMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_hicensor(mut self, hicensor: bool) -> Self {
        self.hicensor = hicensor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.test_parameters().validate()?;
        self.multipliers.validate()?;
        if let Some(method) = self.agg_method {
            if method.is_lwp() && self.agg_period.is_none() {
                return Err(Error::InvalidParameter(format!(
                    "{method} aggregation requires agg_period"
                )));
            }
        } else if self.agg_period.is_some() {
            return Err(Error::InvalidParameter(
                "agg_period given without agg_method".to_string(),
            ));
        }
        Ok(())
    }

    pub fn test_parameters(&self) -> TestParameters {
        TestParameters {
            alpha: self.alpha,
            continuity: self.continuity,
            min_size: self.min_size,
        }
    }

    /// Unit the raw slopes are measured in
    pub fn native_unit(&self, kind: TimeKind) -> Option<TimeUnit> {
        match kind {
            TimeKind::Calendar => Some(TimeUnit::Second),
            TimeKind::Numeric => self.time_unit,
        }
    }

    /// Factor from native slopes to reported slopes, and the reported unit
    pub fn slope_factor(&self, kind: TimeKind) -> Result<(f64, Option<TimeUnit>)> {
        let native = self.native_unit(kind);
        match self.slope_scaling {
            None => Ok((1.0, native)),
            Some(target) => {
                let native = native.ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "cannot scale slopes to {target}: numeric time axis has no time_unit"
                    ))
                })?;
                Ok((native.rate_factor(target), Some(target)))
            }
        }
    }
}

/// Window layout for rolling analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingConfig {
    pub window: RollingWindow,
    /// Distance between window starts; defaults to the window
    pub step: Option<RollingWindow>,
    /// Windows with fewer observations are skipped
    pub min_size: usize,
}

impl RollingConfig {
    pub fn new(window: RollingWindow) -> Self {
        Self {
            window,
            step: None,
            min_size: 10,
        }
    }

    pub fn with_step(mut self, step: RollingWindow) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn step(&self) -> RollingWindow {
        self.step.unwrap_or(self.window)
    }

    /// Reject layouts that cannot be applied to a `kind` time axis
    pub fn validate(&self, kind: TimeKind) -> Result<()> {
        let step = self.step();
        self.window.validate(kind)?;
        step.validate(kind)?;
        match (self.window, step) {
            (RollingWindow::Count(_), RollingWindow::Count(_)) => Ok(()),
            (RollingWindow::Count(_), _) | (_, RollingWindow::Count(_)) => {
                Err(Error::InvalidParameter(format!(
                    "window {} and step {step} must both be counts or both be periods",
                    self.window
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trend_core::CalendarOffset;

    #[test]
    fn test_defaults() {
        let config = TrendConfig::default();
        assert_eq!(config.alpha, 0.05);
        assert!(config.continuity);
        assert_eq!(config.min_size, 5);
        assert_eq!(config.multipliers, CensorMultipliers::default());
        assert!(!config.hicensor);
        assert!(config.validate().is_ok());
        assert_eq!(RollingConfig::new(RollingWindow::Count(12)).min_size, 10);
    }

    #[test]
    fn test_lwp_requires_period() {
        let config = TrendConfig::default().with_agg_method(AggregationMethod::LwpMedian);
        assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));

        let config = config.with_agg_period(Period::Offset(CalendarOffset::years(1).unwrap()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_period_requires_method() {
        let config = TrendConfig::default().with_agg_period(Period::span(1.0).unwrap());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(TrendConfig::default().with_alpha(0.0).validate().is_err());
    }

    #[test]
    fn test_slope_factor() {
        let config = TrendConfig::default();
        assert_eq!(config.slope_factor(TimeKind::Numeric).unwrap(), (1.0, None));
        assert_eq!(
            config.slope_factor(TimeKind::Calendar).unwrap(),
            (1.0, Some(TimeUnit::Second))
        );

        let scaled = TrendConfig::default().with_slope_scaling(TimeUnit::Year);
        assert!(matches!(
            scaled.slope_factor(TimeKind::Numeric),
            Err(Error::InvalidParameter(_))
        ));
        let (factor, unit) = scaled.slope_factor(TimeKind::Calendar).unwrap();
        assert_relative_eq!(factor, 365.25 * 86_400.0);
        assert_eq!(unit, Some(TimeUnit::Year));

        let monthly = scaled.with_time_unit(TimeUnit::Month);
        assert_relative_eq!(monthly.slope_factor(TimeKind::Numeric).unwrap().0, 12.0);
    }

    #[test]
    fn test_rolling_layout_validation() {
        let counts = RollingConfig::new(RollingWindow::Count(10)).with_step(RollingWindow::Count(5));
        assert!(counts.validate(TimeKind::Numeric).is_ok());

        let mixed = RollingConfig::new(RollingWindow::Count(10)).with_step(RollingWindow::Span(2.0));
        assert!(mixed.validate(TimeKind::Numeric).is_err());

        let yearly = RollingConfig::new(RollingWindow::Offset(CalendarOffset::years(1).unwrap()));
        assert!(yearly.validate(TimeKind::Calendar).is_ok());
        assert!(yearly.validate(TimeKind::Numeric).is_err());
    }
}
