//! Sen slope estimator for censored data
//!
//! The slope is the median of all pairwise slopes `(x_j - x_i)/(t_j - t_i)`.
//! Pairs with a censored member are kept but damped by a multiplier, so a
//! detection limit pulls the estimate towards zero instead of dropping out.

use crate::statistic::standard_normal;
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;
use trend_core::utils::{median, median_sorted, sort_in_place};
use trend_core::{CensorType, CensoredValue, Error, Result};

/// Damping applied to pairwise slopes involving censored values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CensorMultipliers {
    /// Applied when either member is `<`
    pub lt_mult: f64,
    /// Applied when either member is `>`
    pub gt_mult: f64,
}

impl Default for CensorMultipliers {
    fn default() -> Self {
        Self {
            lt_mult: 0.5,
            gt_mult: 0.5,
        }
    }
}

impl CensorMultipliers {
    pub fn new(lt_mult: f64, gt_mult: f64) -> Result<Self> {
        let multipliers = Self { lt_mult, gt_mult };
        multipliers.validate()?;
        Ok(multipliers)
    }

    pub fn with_lt_mult(mut self, lt_mult: f64) -> Self {
        self.lt_mult = lt_mult;
        self
    }

    pub fn with_gt_mult(mut self, gt_mult: f64) -> Self {
        self.gt_mult = gt_mult;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, m) in [("lt_mult", self.lt_mult), ("gt_mult", self.gt_mult)] {
            if !m.is_finite() || m < 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be finite and non-negative, got {m}"
                )));
            }
        }
        Ok(())
    }

    /// Combined factor for a pair; both multipliers apply to a mixed pair
    pub fn factor(&self, a: &CensoredValue, b: &CensoredValue) -> f64 {
        let has = |c: CensorType| a.censor() == c || b.censor() == c;
        let mut factor = 1.0;
        if has(CensorType::LessThan) {
            factor *= self.lt_mult;
        }
        if has(CensorType::GreaterThan) {
            factor *= self.gt_mult;
        }
        factor
    }
}

/// All pairwise slopes of a time-ordered sequence
///
/// Pairs sharing a timestamp have no slope and are skipped. Every slope is
/// kept so the median and both interval ranks can be read off one sorted
/// vector: memory grows as n(n-1)/2 `f64`s, about 4 GB at n = 32,000.
/// Thin long series with an aggregation period first.
pub fn sen_slopes(
    values: &[CensoredValue],
    times: &[f64],
    multipliers: &CensorMultipliers,
) -> Result<Vec<f64>> {
    if values.len() != times.len() {
        return Err(Error::size_mismatch(values.len(), times.len(), "Sen slope times"));
    }
    multipliers.validate()?;

    let n = values.len();
    let mut slopes = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            let dt = times[j] - times[i];
            if dt == 0.0 {
                continue;
            }
            let raw = (values[j].value() - values[i].value()) / dt;
            slopes.push(raw * multipliers.factor(&values[i], &values[j]));
        }
    }
    Ok(slopes)
}

/// Confidence bounds on the median slope from the variance of S
///
/// `sorted_slopes` must be in ascending order. Returns `(NaN, NaN)` when
/// there are no slopes.
pub fn confidence_interval(sorted_slopes: &[f64], var_s: f64, alpha: f64) -> Result<(f64, f64)> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }
    if sorted_slopes.is_empty() {
        return Ok((f64::NAN, f64::NAN));
    }

    let z = standard_normal()?.inverse_cdf(1.0 - alpha / 2.0);
    let c = z * var_s.max(0.0).sqrt();
    let n = sorted_slopes.len() as f64;
    let m1 = (n - c) / 2.0;
    let m2 = (n + c) / 2.0 + 1.0;

    // 1-based ranks
    let at = |m: f64| sorted_slopes[m.round().clamp(1.0, n) as usize - 1];
    Ok((at(m1), at(m2)))
}

/// Median slope with its confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SenSlope {
    pub slope: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
    pub n_slopes: usize,
}

impl SenSlope {
    /// Estimate from an unordered set of pairwise slopes
    pub fn from_slopes(mut slopes: Vec<f64>, var_s: f64, alpha: f64) -> Result<Self> {
        sort_in_place(&mut slopes);
        let (lower_ci, upper_ci) = confidence_interval(&slopes, var_s, alpha)?;
        Ok(Self {
            slope: median_sorted(&slopes),
            lower_ci,
            upper_ci,
            n_slopes: slopes.len(),
        })
    }

    /// Multiply slope and bounds by a unit conversion factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            slope: self.slope * factor,
            lower_ci: self.lower_ci * factor,
            upper_ci: self.upper_ci * factor,
            n_slopes: self.n_slopes,
        }
    }
}

/// Slopes, median and confidence interval in one pass
pub fn sen_slope(
    values: &[CensoredValue],
    times: &[f64],
    var_s: f64,
    alpha: f64,
    multipliers: &CensorMultipliers,
) -> Result<SenSlope> {
    SenSlope::from_slopes(sen_slopes(values, times, multipliers)?, var_s, alpha)
}

/// Line intercept `median(x) - slope * median(t)`
pub fn sen_intercept(values: &[CensoredValue], times: &[f64], slope: f64) -> f64 {
    let xs: Vec<f64> = values.iter().map(|v| v.value()).collect();
    median(&xs) - slope * median(times)
}
