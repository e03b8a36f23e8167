//! Result records produced by the trend tests

use serde::{Deserialize, Serialize};
use std::fmt;
use trend_core::{TimeUnit, Timestamp};
use trend_kendall::{Likelihood, TrendDirection};

/// Statistically weak condition noted on a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendWarning {
    /// Fewer points than the configured minimum
    SmallSample { n: usize, min: usize },
    /// varS is zero, so no direction can be inferred
    ZeroVariance,
    /// No pair of distinct timestamps to form a slope
    NoSlopes,
}

impl fmt::Display for TrendWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallSample { n, min } => {
                write!(f, "sample size {n} is below the minimum of {min}")
            }
            Self::ZeroVariance => write!(f, "variance of S is zero"),
            Self::NoSlopes => write!(f, "no pairwise slopes available"),
        }
    }
}

/// Outcome of a single-series or seasonal trend test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub s: i64,
    pub var_s: f64,
    pub p: f64,
    pub z: f64,
    /// Whether the trend is significant at the configured alpha
    pub h: bool,
    pub trend: TrendDirection,
    /// Kendall's tau-b
    pub tau: f64,
    /// Probability that the trend direction matches the sign of S
    pub confidence: f64,
    /// Sen slope per native time unit
    pub slope: f64,
    pub intercept: f64,
    pub lower_ci: f64,
    pub upper_ci: f64,
    pub scaled_slope: f64,
    pub scaled_lower_ci: f64,
    pub scaled_upper_ci: f64,
    /// Unit of the scaled slope, when known
    pub slope_unit: Option<TimeUnit>,
    /// Points tested after aggregation
    pub n: usize,
    pub warnings: Vec<TrendWarning>,
}

impl TrendResult {
    /// Placeholder for a sample too small to test at all
    pub fn indeterminate(n: usize, min_size: usize) -> Self {
        Self {
            s: 0,
            var_s: 0.0,
            p: 1.0,
            z: 0.0,
            h: false,
            trend: TrendDirection::Indeterminate,
            tau: 0.0,
            confidence: 0.5,
            slope: f64::NAN,
            intercept: f64::NAN,
            lower_ci: f64::NAN,
            upper_ci: f64::NAN,
            scaled_slope: f64::NAN,
            scaled_lower_ci: f64::NAN,
            scaled_upper_ci: f64::NAN,
            slope_unit: None,
            n,
            warnings: vec![TrendWarning::SmallSample { n, min: min_size }, TrendWarning::NoSlopes],
        }
    }

    pub fn likelihood(&self) -> Likelihood {
        Likelihood::from_confidence(self.confidence)
    }

    pub fn has_warning(&self, warning: &TrendWarning) -> bool {
        self.warnings.contains(warning)
    }
}

impl fmt::Display for TrendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (S = {}, p = {:.4}, n = {}), slope {:.4} [{:.4}, {:.4}]",
            self.trend,
            self.s,
            self.p,
            self.n,
            self.scaled_slope,
            self.scaled_lower_ci,
            self.scaled_upper_ci
        )?;
        if let Some(unit) = self.slope_unit {
            write!(f, " per {unit}")?;
        }
        Ok(())
    }
}

/// Trend test over one rolling window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingRow {
    pub window_start: Timestamp,
    pub window_end: Timestamp,
    pub result: TrendResult,
}

impl fmt::Display for RollingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}): {}", self.window_start, self.window_end, self.result)
    }
}

/// Ordered rows, one per tested window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingResult {
    rows: Vec<RollingRow>,
}

impl RollingResult {
    pub fn new(rows: Vec<RollingRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RollingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RollingRow> {
        self.rows.iter()
    }

    pub fn window_starts(&self) -> Vec<Timestamp> {
        self.rows.iter().map(|r| r.window_start).collect()
    }

    pub fn scaled_slopes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.result.scaled_slope).collect()
    }

    /// Windows reporting a significant trend
    pub fn significant(&self) -> impl Iterator<Item = &RollingRow> {
        self.rows.iter().filter(|r| r.result.h)
    }
}

impl fmt::Display for RollingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Side of a breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodSide {
    Before,
    After,
}

impl fmt::Display for PeriodSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonWarning {
    InsufficientData { side: PeriodSide, n: usize, min: usize },
}

impl fmt::Display for ComparisonWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { side, n, min } => write!(
                f,
                "insufficient data {side} breakpoint: {n} points, minimum {min}"
            ),
        }
    }
}

/// Trend tests either side of a breakpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub breakpoint: Timestamp,
    pub before: TrendResult,
    pub after: TrendResult,
    pub warnings: Vec<ComparisonWarning>,
}

impl PeriodComparison {
    /// `after - before` in scaled units; NaN when either side has no slope
    pub fn slope_change(&self) -> f64 {
        self.after.scaled_slope - self.before.scaled_slope
    }

    pub fn result(&self, side: PeriodSide) -> &TrendResult {
        match side {
            PeriodSide::Before => &self.before,
            PeriodSide::After => &self.after,
        }
    }
}

impl fmt::Display for PeriodComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "breakpoint {}", self.breakpoint)?;
        writeln!(f, "  before: {}", self.before)?;
        writeln!(f, "  after:  {}", self.after)?;
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}
