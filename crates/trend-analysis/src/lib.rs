//! Trend tests for censored environmental time series
//!
//! This crate builds complete analyses on top of the statistics in
//! [`trend_kendall`]:
//!
//! - **Aggregation**: [`aggregate_series`] collapses duplicate timestamps or
//!   period buckets with an [`AggregationMethod`]
//! - **Single series**: [`trend_test`] runs Mann-Kendall and Sen slope with
//!   optional hi-censoring, aggregation and slope scaling
//! - **Seasonal**: [`seasonal_trend_test`] sums S and varS over seasons
//! - **Rolling**: [`RollingAnalyzer`] applies any [`TrendTest`] to
//!   successive windows; [`rolling_trend_test`] is the single-series form
//! - **Comparison**: [`compare_periods`] tests either side of a breakpoint
//!
//! Weak samples never fail: they yield an indeterminate trend and a
//! [`TrendWarning`]. Errors are reserved for invalid input and for series
//! too small to form a single slope.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use trend_analysis::{seasonal_trend_test, TrendConfig};
//! use trend_core::{CensoredValue, TimeSeries, TimeUnit};
//!
//! let mut times = Vec::new();
//! let mut values = Vec::new();
//! for year in 2010..2020 {
//!     for month in [1, 7] {
//!         let date = NaiveDate::from_ymd_opt(year, month, 15).unwrap();
//!         times.push(date.and_hms_opt(0, 0, 0).unwrap());
//!         let level = f64::from(year - 2010) + if month == 7 { 5.0 } else { 0.0 };
//!         values.push(CensoredValue::exact(level).unwrap());
//!     }
//! }
//! let series = TimeSeries::calendar(&times, &values).unwrap();
//!
//! let config = TrendConfig::default().with_slope_scaling(TimeUnit::Year);
//! let result = seasonal_trend_test(&series, 12, &config).unwrap();
//! assert!(result.h);
//! assert!((result.scaled_slope - 1.0).abs() < 0.01);
//! ```

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod rolling;
pub mod seasonal;
pub mod single;
pub mod traits;
pub mod types;

pub use aggregate::{aggregate, aggregate_series, AggregationMethod};
pub use compare::{compare_periods, compare_periods_with};
pub use config::{RollingConfig, TrendConfig};
pub use rolling::{rolling_trend_test, RollingAnalyzer, RollingWindow};
pub use seasonal::{seasonal_trend_test, SeasonalMannKendallTest, Seasonality};
pub use single::{trend_test, MannKendallTest};
pub use traits::{TrendTest, TrendTestProperties};
pub use types::{
    ComparisonWarning, PeriodComparison, PeriodSide, RollingResult, RollingRow, TrendResult,
    TrendWarning,
};
