//! Rolling-window trend analysis

use crate::config::{RollingConfig, TrendConfig};
use crate::single::MannKendallTest;
use crate::traits::{TrendTest, TrendTestProperties};
use crate::types::{RollingResult, RollingRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};
use trend_core::{CalendarOffset, Error, Period, Result, TimeKind, TimeSeries, Timestamp};

/// Width of a rolling window, or the step between window starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RollingWindow {
    /// Number of consecutive observations
    Count(usize),
    /// Fixed width on a numeric axis
    Span(f64),
    /// Calendar offset on a calendar axis
    Offset(CalendarOffset),
}

impl RollingWindow {
    fn period(&self) -> Option<Period> {
        match self {
            Self::Count(_) => None,
            Self::Span(w) => Some(Period::Span(*w)),
            Self::Offset(o) => Some(Period::Offset(*o)),
        }
    }

    /// Reject empty windows and periods of the wrong axis kind
    pub fn validate(&self, kind: TimeKind) -> Result<()> {
        match self {
            Self::Count(0) => Err(Error::InvalidParameter(
                "rolling window count must be positive".to_string(),
            )),
            Self::Count(_) => Ok(()),
            Self::Span(w) => Period::span(*w)?.check_kind(kind),
            Self::Offset(o) => Period::Offset(*o).check_kind(kind),
        }
    }
}

impl From<Period> for RollingWindow {
    fn from(period: Period) -> Self {
        match period {
            Period::Span(w) => Self::Span(w),
            Period::Offset(o) => Self::Offset(o),
        }
    }
}

impl fmt::Display for RollingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n} observations"),
            Self::Span(w) => write!(f, "{w}"),
            Self::Offset(o) => write!(f, "{o}"),
        }
    }
}

impl FromStr for RollingWindow {
    type Err = Error;

    /// A bare number is a numeric span, anything else a calendar offset
    fn from_str(s: &str) -> Result<Self> {
        Ok(s.parse::<Period>()?.into())
    }
}

/// One window: observation range plus its nominal bounds
struct Window {
    start: Timestamp,
    end: Timestamp,
    series: TimeSeries,
}

/// Runs a trend test over successive windows of a series
#[derive(Debug, Clone)]
pub struct RollingAnalyzer<T: TrendTest> {
    test: T,
    config: RollingConfig,
}

impl<T: TrendTest> RollingAnalyzer<T> {
    pub fn new(test: T, config: RollingConfig) -> Self {
        Self { test, config }
    }

    pub fn test(&self) -> &T {
        &self.test
    }

    pub fn config(&self) -> &RollingConfig {
        &self.config
    }

    /// Windows of `width` observations starting every `step` observations
    ///
    /// A window ends at the first observation after it. The final windows
    /// run out of observations and end at the last timestamp instead, which
    /// they include.
    fn count_windows(&self, series: &TimeSeries, width: usize, step: usize) -> Result<Vec<Window>> {
        let obs = series.observations();
        let Some(last) = series.last_time() else {
            return Ok(Vec::new());
        };

        (0..obs.len())
            .step_by(step)
            .map(|first| {
                let stop = (first + width).min(obs.len());
                Ok(Window {
                    start: obs[first].time,
                    end: obs.get(first + width).map_or(last, |o| o.time),
                    series: TimeSeries::from_observations(series.kind(), obs[first..stop].to_vec())?,
                })
            })
            .collect()
    }

    fn period_windows(&self, series: &TimeSeries, width: Period, step: Period) -> Result<Vec<Window>> {
        let (Some(first), Some(last)) = (series.first_time(), series.last_time()) else {
            return Ok(Vec::new());
        };

        let mut windows = Vec::new();
        let mut start = first;
        let mut k: u32 = 0;
        while start.axis_value() <= last.axis_value() {
            let end = width.advance(start)?;
            windows.push(Window {
                start,
                end,
                series: series.between(start, end),
            });
            k = k.checked_add(1).ok_or_else(|| {
                Error::InvalidParameter(format!("too many windows of step {step}"))
            })?;
            let next = step.advance_by(first, k)?;
            if next.axis_value() <= start.axis_value() {
                return Err(Error::InvalidParameter(format!(
                    "step {step} is too small to advance past {start}"
                )));
            }
            start = next;
        }
        Ok(windows)
    }

    fn windows(&self, series: &TimeSeries) -> Result<Vec<Window>> {
        self.config.validate(series.kind())?;
        let step = self.config.step();
        match (self.config.window, step) {
            (RollingWindow::Count(width), RollingWindow::Count(step)) => {
                self.count_windows(series, width, step)
            }
            (window, step) => match (window.period(), step.period()) {
                (Some(width), Some(step)) => self.period_windows(series, width, step),
                _ => Err(Error::InvalidParameter(format!(
                    "cannot combine window {window} with step {step}"
                ))),
            },
        }
    }

    /// Test every window holding at least `min_size` observations
    #[instrument(skip(self, series), fields(n = series.len(), test = self.test.test_name()))]
    pub fn run(&self, series: &TimeSeries) -> Result<RollingResult> {
        let windows = self.windows(series)?;
        let total = windows.len();
        let mut rows = Vec::with_capacity(total);

        for window in windows {
            if window.series.len() < self.config.min_size {
                debug!(
                    start = %window.start,
                    n = window.series.len(),
                    min_size = self.config.min_size,
                    "skipping sparse window"
                );
                continue;
            }
            match self.test.test(&window.series) {
                Ok(result) => rows.push(RollingRow {
                    window_start: window.start,
                    window_end: window.end,
                    result,
                }),
                Err(e) if e.is_insufficient_data() => {
                    debug!(start = %window.start, error = %e, "skipping untestable window");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(windows = total, rows = rows.len(), "rolling analysis complete");
        Ok(RollingResult::new(rows))
    }
}

/// Rolling single-series trend test
///
/// `step` defaults to `window`. Windows are `[start, end)` from the first
/// timestamp and advance while `start` is not past the last timestamp. The
/// k-th start is the first timestamp plus k steps, so month steps from the
/// 31st keep returning to month ends. A count window cut short by the end of
/// the series reports the last timestamp as its (inclusive) end.
pub fn rolling_trend_test(
    series: &TimeSeries,
    window: RollingWindow,
    step: Option<RollingWindow>,
    min_size: usize,
    config: &TrendConfig,
) -> Result<RollingResult> {
    let mut rolling = RollingConfig::new(window).with_min_size(min_size);
    rolling.step = step;
    RollingAnalyzer::new(MannKendallTest::new(config.clone()), rolling).run(series)
}
