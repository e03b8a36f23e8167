//! Mann-Kendall S statistic, variance and significance
//!
//! S is the sum of [`compare`] scores over every ordered pair. Its variance
//! under the null hypothesis is
//!
//! ```text
//! varS = [n(n-1)(2n+5) - Σ t(t-1)(2t+5)] / 18
//! ```
//!
//! where each `t` is the size of a tie group: observations sharing both the
//! reported value and the censoring type. The normal approximation with an
//! optional continuity correction turns S and varS into a two-sided p-value.

use crate::comparison::{compare, PairSign};
use crate::types::{Likelihood, TrendDirection};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;
use tracing::debug;
use trend_core::{CensorType, CensoredValue, Error, Result};

/// Tallies of the pairwise comparison loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    pub s: i64,
    pub tied: usize,
    pub excluded: usize,
}

impl PairCounts {
    fn record(&mut self, sign: PairSign) {
        self.s += sign.score();
        match sign {
            PairSign::Tie => self.tied += 1,
            PairSign::Excluded => self.excluded += 1,
            PairSign::Increase | PairSign::Decrease => {}
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            s: self.s + other.s,
            tied: self.tied + other.tied,
            excluded: self.excluded + other.excluded,
        }
    }
}

fn row_counts(values: &[CensoredValue], i: usize) -> PairCounts {
    let mut counts = PairCounts::default();
    for later in &values[i + 1..] {
        counts.record(compare(&values[i], later));
    }
    counts
}

/// Compare every pair `i < j` of a time-ordered sequence
#[cfg(not(feature = "parallel"))]
pub fn pair_counts(values: &[CensoredValue]) -> PairCounts {
    (0..values.len())
        .map(|i| row_counts(values, i))
        .fold(PairCounts::default(), PairCounts::merge)
}

/// Compare every pair `i < j` of a time-ordered sequence
#[cfg(feature = "parallel")]
pub fn pair_counts(values: &[CensoredValue]) -> PairCounts {
    use rayon::prelude::*;

    (0..values.len())
        .into_par_iter()
        .map(|i| row_counts(values, i))
        .reduce(PairCounts::default, PairCounts::merge)
}

/// Sizes of tie groups (groups larger than one only)
pub fn tie_groups(values: &[CensoredValue]) -> Vec<usize> {
    let mut groups: BTreeMap<(OrderedFloat<f64>, CensorType), usize> = BTreeMap::new();
    for v in values {
        *groups.entry((OrderedFloat(v.value()), v.censor())).or_default() += 1;
    }
    groups.into_values().filter(|&t| t > 1).collect()
}

/// Tie-corrected variance of S, clamped at zero
pub fn variance(n: usize, ties: &[usize]) -> f64 {
    let nf = n as f64;
    let base = nf * (nf - 1.0) * (2.0 * nf + 5.0);
    let correction: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * (t - 1.0) * (2.0 * t + 5.0)
        })
        .sum();
    ((base - correction) / 18.0).max(0.0)
}

/// S, its variance and the bookkeeping needed to combine or report them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MannKendallStatistic {
    pub s: i64,
    pub var_s: f64,
    pub n: usize,
    pub tie_groups: Vec<usize>,
    pub tied_pairs: usize,
    pub excluded_pairs: usize,
    tau_denominator: f64,
}

/// Compute S and varS for a time-ordered sequence
pub fn mk_statistic(values: &[CensoredValue]) -> MannKendallStatistic {
    let n = values.len();
    let counts = pair_counts(values);
    let ties = tie_groups(values);
    let var_s = variance(n, &ties);

    let n0 = (n * n.saturating_sub(1) / 2) as f64;
    let n1 = counts.tied as f64;
    let tau_denominator = ((n0 - n1).max(0.0) * n0).sqrt();

    MannKendallStatistic {
        s: counts.s,
        var_s,
        n,
        tie_groups: ties,
        tied_pairs: counts.tied,
        excluded_pairs: counts.excluded,
        tau_denominator,
    }
}

impl MannKendallStatistic {
    /// Sum independent statistics (one per season)
    pub fn combine<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = MannKendallStatistic>,
    {
        parts.into_iter().fold(
            Self {
                s: 0,
                var_s: 0.0,
                n: 0,
                tie_groups: Vec::new(),
                tied_pairs: 0,
                excluded_pairs: 0,
                tau_denominator: 0.0,
            },
            |mut acc, part| {
                acc.s += part.s;
                acc.var_s += part.var_s;
                acc.n += part.n;
                acc.tie_groups.extend(part.tie_groups);
                acc.tied_pairs += part.tied_pairs;
                acc.excluded_pairs += part.excluded_pairs;
                acc.tau_denominator += part.tau_denominator;
                acc
            },
        )
    }

    /// Kendall's tau-b against an untied time axis
    pub fn tau(&self) -> f64 {
        if self.tau_denominator > 0.0 {
            self.s as f64 / self.tau_denominator
        } else {
            0.0
        }
    }

    pub fn z_score(&self, continuity: bool) -> f64 {
        z_score(self.s, self.var_s, continuity)
    }

    pub fn p_value(&self, continuity: bool) -> Result<f64> {
        p_value(self.s, self.var_s, continuity)
    }

    /// Significance, direction and confidence for these parameters
    pub fn evaluate(&self, params: &TestParameters) -> Result<TrendDecision> {
        params.validate()?;

        let z = self.z_score(params.continuity);
        let p = self.p_value(params.continuity)?;
        let sample_ok = self.n >= params.min_size;
        let h = sample_ok && p < params.alpha;

        let trend = if !sample_ok {
            TrendDirection::Indeterminate
        } else if !h {
            TrendDirection::NoTrend
        } else if self.s > 0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        debug!(
            s = self.s,
            var_s = self.var_s,
            n = self.n,
            z,
            p,
            trend = %trend,
            "Mann-Kendall decision"
        );

        Ok(TrendDecision {
            z,
            p,
            h,
            trend,
            confidence: 1.0 - p / 2.0,
        })
    }
}

/// Standardised test statistic
///
/// `S == 0` and a non-positive variance both give exactly zero, so the
/// no-trend case never depends on floating-point noise.
pub fn z_score(s: i64, var_s: f64, continuity: bool) -> f64 {
    if s == 0 || var_s <= 0.0 {
        return 0.0;
    }
    let sd = var_s.sqrt();
    let s = s as f64;
    if !continuity {
        s / sd
    } else if s > 0.0 {
        (s - 1.0) / sd
    } else {
        (s + 1.0) / sd
    }
}

/// Two-sided p-value `2(1 - Φ(|Z|))`
pub fn p_value(s: i64, var_s: f64, continuity: bool) -> Result<f64> {
    let z = z_score(s, var_s, continuity);
    if z == 0.0 {
        return Ok(1.0);
    }
    let p = 2.0 * (1.0 - standard_normal()?.cdf(z.abs()));
    Ok(p.clamp(0.0, 1.0))
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0)
        .map_err(|e| Error::Computation(format!("Failed to create normal distribution: {e}")))
}

/// Parameters of the significance test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    /// Significance level
    pub alpha: f64,
    /// Apply the ±1 continuity correction to S
    pub continuity: bool,
    /// Samples below this size are reported as indeterminate
    pub min_size: usize,
}

impl Default for TestParameters {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            continuity: true,
            min_size: 5,
        }
    }
}

impl TestParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Outcome of the significance test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendDecision {
    pub z: f64,
    pub p: f64,
    pub h: bool,
    pub trend: TrendDirection,
    /// Probability that the sign of S is the true direction, `1 - p/2`
    pub confidence: f64,
}

impl TrendDecision {
    pub fn likelihood(&self) -> Likelihood {
        Likelihood::from_confidence(self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn exact(values: &[f64]) -> Vec<CensoredValue> {
        values.iter().map(|&v| CensoredValue::exact(v).unwrap()).collect()
    }

    fn brute_force_s(values: &[f64]) -> i64 {
        let mut concordant = 0;
        let mut discordant = 0;
        for i in 0..values.len() {
            for j in i + 1..values.len() {
                if values[j] > values[i] {
                    concordant += 1;
                } else if values[j] < values[i] {
                    discordant += 1;
                }
            }
        }
        concordant - discordant
    }

    #[test]
    fn test_monotone_series() {
        let stat = mk_statistic(&exact(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(stat.s, 10);
        assert_relative_eq!(stat.var_s, 5.0 * 4.0 * 15.0 / 18.0);
        assert_relative_eq!(stat.tau(), 1.0);

        let z = stat.z_score(true);
        assert_relative_eq!(z, 9.0 / (250.0_f64 / 15.0).sqrt(), epsilon = 1e-12);
        let p = stat.p_value(true).unwrap();
        assert_relative_eq!(p, 0.0275, epsilon = 5e-4);
    }

    #[test]
    fn test_tie_correction() {
        let stat = mk_statistic(&exact(&[1.0, 1.0, 2.0]));
        assert_eq!(stat.s, 2);
        assert_eq!(stat.tie_groups, vec![2]);
        assert_eq!(stat.tied_pairs, 1);
        assert_relative_eq!(stat.var_s, (66.0 - 18.0) / 18.0);
    }

    #[test]
    fn test_censored_ties_count_as_ties() {
        let values = vec![
            CensoredValue::less_than(1.0).unwrap(),
            CensoredValue::less_than(1.0).unwrap(),
            CensoredValue::exact(1.0).unwrap(),
            CensoredValue::exact(3.0).unwrap(),
        ];
        let stat = mk_statistic(&values);
        assert_eq!(stat.tie_groups, vec![2]);
        // <1,<1 tie; every other pair increases
        assert_eq!(stat.s, 5);
        assert_eq!(stat.excluded_pairs, 0);
    }

    #[test]
    fn test_excluded_pairs_do_not_score() {
        let values = vec![
            CensoredValue::less_than(5.0).unwrap(),
            CensoredValue::exact(2.0).unwrap(),
            CensoredValue::exact(3.0).unwrap(),
        ];
        let stat = mk_statistic(&values);
        assert_eq!(stat.excluded_pairs, 2);
        assert_eq!(stat.s, 1);
    }

    #[test]
    fn test_zero_s_gives_unit_p_value() {
        let stat = mk_statistic(&exact(&[1.0, 2.0, 2.0, 1.0, 1.5, 1.5]));
        assert_eq!(stat.s, brute_force_s(&[1.0, 2.0, 2.0, 1.0, 1.5, 1.5]));
        let stat = mk_statistic(&exact(&[1.0, 2.0, 2.0, 1.0]));
        assert_eq!(stat.s, 0);
        assert_eq!(stat.z_score(true), 0.0);
        assert_eq!(stat.z_score(false), 0.0);
        assert_eq!(stat.p_value(true).unwrap(), 1.0);

        let decision = stat
            .evaluate(&TestParameters {
                min_size: 2,
                ..Default::default()
            })
            .unwrap();
        assert!(!decision.h);
        assert_eq!(decision.p, 1.0);
        assert_eq!(decision.trend, TrendDirection::NoTrend);
    }

    #[test]
    fn test_zero_variance_is_no_trend() {
        let stat = mk_statistic(&exact(&[3.0; 6]));
        assert_eq!(stat.var_s, 0.0);
        assert_eq!(stat.tau(), 0.0);
        let decision = stat.evaluate(&TestParameters::default()).unwrap();
        assert_eq!(decision.p, 1.0);
        assert!(!decision.h);
        assert_eq!(decision.trend, TrendDirection::NoTrend);
    }

    #[test]
    fn test_small_sample_is_indeterminate() {
        let stat = mk_statistic(&exact(&[1.0, 2.0, 3.0]));
        let decision = stat.evaluate(&TestParameters::default()).unwrap();
        assert_eq!(decision.trend, TrendDirection::Indeterminate);
        assert!(!decision.h);
    }

    #[test]
    fn test_significant_decrease() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let decision = mk_statistic(&exact(&values))
            .evaluate(&TestParameters::default())
            .unwrap();
        assert!(decision.h);
        assert_eq!(decision.trend, TrendDirection::Decreasing);
        assert!(decision.z < 0.0);
        assert_eq!(decision.likelihood(), Likelihood::ExtremelyLikely);
    }

    #[test]
    fn test_continuity_correction_shrinks_z() {
        let stat = mk_statistic(&exact(&[1.0, 3.0, 2.0, 5.0, 4.0, 6.0]));
        assert!(stat.z_score(true).abs() < stat.z_score(false).abs());
    }

    #[test]
    fn test_invalid_alpha() {
        let stat = mk_statistic(&exact(&[1.0, 2.0]));
        let params = TestParameters {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(matches!(stat.evaluate(&params), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_combine_sums_components() {
        let a = mk_statistic(&exact(&[1.0, 2.0, 3.0]));
        let b = mk_statistic(&exact(&[5.0, 4.0, 4.0]));
        let combined = MannKendallStatistic::combine(vec![a.clone(), b.clone()]);
        assert_eq!(combined.s, a.s + b.s);
        assert_relative_eq!(combined.var_s, a.var_s + b.var_s);
        assert_eq!(combined.n, 6);
        assert_eq!(combined.tie_groups, vec![2]);
    }

    proptest! {
        #[test]
        fn prop_s_matches_brute_force(values in Just((0..30).map(|i| i as f64).collect::<Vec<_>>()).prop_shuffle()) {
            let stat = mk_statistic(&exact(&values));
            prop_assert_eq!(stat.s, brute_force_s(&values));
            prop_assert!(stat.tie_groups.is_empty());
        }

        #[test]
        fn prop_p_value_bounded(values in proptest::collection::vec(-1e3_f64..1e3, 2..40)) {
            let stat = mk_statistic(&exact(&values));
            let p = stat.p_value(true).unwrap();
            prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
            prop_assert!(stat.var_s >= 0.0);
        }
    }
}
