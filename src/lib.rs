//! Nonparametric trend detection for censored environmental time series
//!
//! This crate re-exports the workspace crates:
//!
//! - [`core`]: censored values, the time axis and [`TimeSeries`]
//! - [`kendall`]: Mann-Kendall S, its variance and the Sen slope
//! - [`analysis`]: single, seasonal, rolling and breakpoint trend tests
//!
//! # Example
//!
//! ```rust
//! use censored_trend::prelude::*;
//!
//! let raw: Vec<RawValue> = vec![
//!     "<0.5".into(), 0.7.into(), "<0.5".into(), 1.1.into(), 0.9.into(),
//!     1.4.into(), 1.3.into(), 1.8.into(), 2.0.into(), 1.9.into(),
//! ];
//! let times: Vec<f64> = (0..raw.len()).map(|i| 2010.0 + i as f64).collect();
//! let series = TimeSeries::parse_numeric(&times, &raw).unwrap();
//!
//! let config = TrendConfig::default().with_time_unit(TimeUnit::Year);
//! let result = trend_test(&series, &config).unwrap();
//!
//! assert_eq!(result.trend, TrendDirection::Increasing);
//! println!("{result}");
//! ```

pub use trend_analysis as analysis;
pub use trend_core as core;
pub use trend_kendall as kendall;

pub use trend_analysis::{
    compare_periods, rolling_trend_test, seasonal_trend_test, trend_test, PeriodComparison,
    RollingResult, TrendConfig, TrendResult,
};
pub use trend_core::{CensoredValue, Error, Result, TimeSeries};

/// Prelude module for convenient imports
pub mod prelude {
    pub use trend_analysis::{
        aggregate_series, compare_periods, compare_periods_with, rolling_trend_test,
        seasonal_trend_test, trend_test, AggregationMethod, MannKendallTest, PeriodComparison,
        RollingAnalyzer, RollingConfig, RollingResult, RollingWindow, SeasonalMannKendallTest,
        Seasonality, TrendConfig, TrendResult, TrendTest, TrendTestProperties, TrendWarning,
    };
    pub use trend_core::prelude::*;
    pub use trend_kendall::{CensorMultipliers, Likelihood, TrendDirection};
}
