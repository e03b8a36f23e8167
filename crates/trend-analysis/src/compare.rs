//! Before/after comparison around a breakpoint

use crate::config::TrendConfig;
use crate::single::MannKendallTest;
use crate::traits::{TrendTest, TrendTestProperties};
use crate::types::{ComparisonWarning, PeriodComparison, PeriodSide, TrendResult};
use tracing::{instrument, warn};
use trend_core::{Error, Result, TimeSeries, Timestamp};

fn test_side<T: TrendTest>(test: &T, part: &TimeSeries) -> Result<TrendResult> {
    match test.test(part) {
        Err(e) if e.is_insufficient_data() => Ok(TrendResult::indeterminate(
            part.len(),
            test.minimum_sample_size(),
        )),
        other => other,
    }
}

/// Run `test` on observations before (`t < breakpoint`) and from
/// (`t >= breakpoint`) the breakpoint
///
/// A side with fewer than the test's minimum sample size is reported in
/// the warnings; a side too small to test at all gets an indeterminate
/// result with NaN slopes.
#[instrument(skip(test, series), fields(n = series.len(), test = test.test_name()))]
pub fn compare_periods_with<T: TrendTest>(
    test: &T,
    series: &TimeSeries,
    breakpoint: Timestamp,
) -> Result<PeriodComparison> {
    if breakpoint.kind() != series.kind() {
        return Err(Error::InvalidParameter(format!(
            "{} breakpoint on a {} time axis",
            breakpoint.kind(),
            series.kind()
        )));
    }

    let bp = breakpoint.axis_value();
    let before = series.filter(|o| o.time.axis_value() < bp);
    let after = series.filter(|o| o.time.axis_value() >= bp);

    let min = test.minimum_sample_size();
    let mut warnings = Vec::new();
    for (side, part) in [(PeriodSide::Before, &before), (PeriodSide::After, &after)] {
        if part.len() < min {
            warn!(%side, n = part.len(), min_size = min, "insufficient data for period comparison");
            warnings.push(ComparisonWarning::InsufficientData {
                side,
                n: part.len(),
                min,
            });
        }
    }

    Ok(PeriodComparison {
        breakpoint,
        before: test_side(test, &before)?,
        after: test_side(test, &after)?,
        warnings,
    })
}

/// Single-series trend tests either side of a breakpoint
pub fn compare_periods(
    series: &TimeSeries,
    breakpoint: Timestamp,
    config: &TrendConfig,
) -> Result<PeriodComparison> {
    compare_periods_with(&MannKendallTest::new(config.clone()), series, breakpoint)
}
