//! Core traits for trend tests
//!
//! Rolling and before/after analyses are written against [`TrendTest`], so
//! the same windowing runs a plain or a seasonal test.

use crate::types::TrendResult;
use trend_core::{Result, TimeSeries};

/// Properties of a trend test that don't depend on the data
pub trait TrendTestProperties {
    /// Get the name of the test
    fn test_name(&self) -> &'static str;

    /// Below this many points the test reports an indeterminate trend
    fn minimum_sample_size(&self) -> usize;
}

/// A trend test over a whole series
pub trait TrendTest: TrendTestProperties {
    /// Run the test
    ///
    /// Returns [`trend_core::Error::InsufficientData`] when the series has
    /// too few distinct timestamps to form any slope.
    fn test(&self, series: &TimeSeries) -> Result<TrendResult>;
}
