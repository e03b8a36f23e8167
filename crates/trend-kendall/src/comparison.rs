//! Pairwise comparison of censored observations
//!
//! Each observation is read as an interval: an exact value `a` is `[a, a]`,
//! `<a` is `(-inf, a)` and `>a` is `(a, +inf)`. A pair gets a definite sign
//! only when no values inside the two intervals could reverse it. Anything
//! else is [`PairSign::Excluded`]: the pair contributes nothing to S, so no
//! ordering is ever asserted from incomplete information.

use serde::{Deserialize, Serialize};
use trend_core::{CensorType, CensoredValue};

/// Outcome of comparing an earlier observation with a later one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairSign {
    /// Later value is larger (+1)
    Increase,
    /// Later value is smaller (-1)
    Decrease,
    /// Values are indistinguishable (0, counted as a tie)
    Tie,
    /// Censoring makes the order unknowable (0, not a tie)
    Excluded,
}

impl PairSign {
    /// Contribution to the S statistic
    pub fn score(&self) -> i64 {
        match self {
            Self::Increase => 1,
            Self::Decrease => -1,
            Self::Tie | Self::Excluded => 0,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Self::Excluded)
    }
}

fn exact_sign(earlier: f64, later: f64) -> PairSign {
    if later > earlier {
        PairSign::Increase
    } else if later < earlier {
        PairSign::Decrease
    } else {
        PairSign::Tie
    }
}

/// Decide the sign of `later - earlier` under censoring
///
/// # Examples
///
/// ```rust
/// use trend_core::CensoredValue;
/// use trend_kendall::{compare, PairSign};
///
/// let dl = CensoredValue::less_than(3.0).unwrap();
/// let five = CensoredValue::exact(5.0).unwrap();
/// let two = CensoredValue::exact(2.0).unwrap();
///
/// assert_eq!(compare(&dl, &five), PairSign::Increase);
/// assert_eq!(compare(&dl, &two), PairSign::Excluded);
/// ```
pub fn compare(earlier: &CensoredValue, later: &CensoredValue) -> PairSign {
    use CensorType as C;

    let (a, b) = (earlier.value(), later.value());
    match (earlier.censor(), later.censor()) {
        (C::None, C::None) => exact_sign(a, b),
        (C::LessThan, C::LessThan) | (C::GreaterThan, C::GreaterThan) => {
            if a == b {
                PairSign::Tie
            } else {
                PairSign::Excluded
            }
        }
        // upper bound of earlier <= lower bound of later
        (C::LessThan, C::None) | (C::LessThan, C::GreaterThan) | (C::None, C::GreaterThan) => {
            if b >= a {
                PairSign::Increase
            } else {
                PairSign::Excluded
            }
        }
        // lower bound of earlier >= upper bound of later
        (C::None, C::LessThan) | (C::GreaterThan, C::LessThan) | (C::GreaterThan, C::None) => {
            if a >= b {
                PairSign::Decrease
            } else {
                PairSign::Excluded
            }
        }
    }
}
