//! Censoring-aware Mann-Kendall test and Sen slope estimator
//!
//! This crate provides the statistics behind the trend tests, operating on
//! plain time-ordered slices of [`trend_core::CensoredValue`].
//!
//! # Components
//!
//! - **Comparison**: [`compare`] decides the sign of a pair of censored
//!   observations, or excludes the pair when censoring hides the order
//! - **Statistic**: [`mk_statistic`] computes S and its tie-corrected
//!   variance; [`MannKendallStatistic::evaluate`] turns them into a
//!   p-value, a direction and a confidence
//! - **Sen slope**: [`sen_slopes`] with [`CensorMultipliers`], and
//!   [`confidence_interval`] on the sorted slopes
//!
//! With the `parallel` feature the pairwise S loop runs on rayon.
//!
//! ## Usage
//!
//! ```rust
//! use trend_core::CensoredValue;
//! use trend_kendall::{mk_statistic, TestParameters, TrendDirection};
//!
//! let values: Vec<CensoredValue> = (0..12)
//!     .map(|i| CensoredValue::exact(i as f64).unwrap())
//!     .collect();
//!
//! let stat = mk_statistic(&values);
//! assert_eq!(stat.s, 66);
//!
//! let decision = stat.evaluate(&TestParameters::default()).unwrap();
//! assert_eq!(decision.trend, TrendDirection::Increasing);
//! ```

pub mod comparison;
pub mod sen;
pub mod statistic;
pub mod types;

pub use comparison::{compare, PairSign};
pub use sen::{confidence_interval, sen_intercept, sen_slope, sen_slopes, CensorMultipliers, SenSlope};
pub use statistic::{
    mk_statistic, p_value, pair_counts, tie_groups, variance, z_score, MannKendallStatistic,
    PairCounts, TestParameters, TrendDecision,
};
pub use types::{Likelihood, TrendDirection};
