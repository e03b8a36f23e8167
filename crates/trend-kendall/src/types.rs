//! Types used for trend classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction reported by a trend test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "increasing")]
    Increasing,
    #[serde(rename = "decreasing")]
    Decreasing,
    /// The test ran and found no significant trend
    #[serde(rename = "no trend")]
    NoTrend,
    /// The test ran but the sample is too small to trust either call
    #[serde(rename = "indeterminate")]
    Indeterminate,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::NoTrend => "no trend",
            Self::Indeterminate => "indeterminate",
        }
    }

    /// Whether a significant monotonic trend was found
    pub fn is_trend(&self) -> bool {
        matches!(self, Self::Increasing | Self::Decreasing)
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verbal category for the confidence that the sign of S is the true
/// direction of the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Likelihood {
    AsLikelyAsNot,
    Likely,
    VeryLikely,
    ExtremelyLikely,
}

impl Likelihood {
    /// Categorise a direction confidence in `[0.5, 1]`
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.95 {
            Self::ExtremelyLikely
        } else if confidence >= 0.90 {
            Self::VeryLikely
        } else if confidence >= 0.67 {
            Self::Likely
        } else {
            Self::AsLikelyAsNot
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsLikelyAsNot => write!(f, "As likely as not"),
            Self::Likely => write!(f, "Likely"),
            Self::VeryLikely => write!(f, "Very likely"),
            Self::ExtremelyLikely => write!(f, "Extremely likely"),
        }
    }
}
