//! Integration tests for rolling windows and breakpoint comparison

mod common;

use chrono::Duration;
use common::*;
use trend_analysis::*;
use trend_core::{CalendarOffset, TimeSeries, Timestamp};
use trend_kendall::TrendDirection;

#[test]
fn test_yearly_calendar_windows() {
    let series = monthly_index_series(2000, 60);
    let window: RollingWindow = "1 year".parse().unwrap();
    let result = rolling_trend_test(&series, window, None, 10, &TrendConfig::default()).unwrap();

    assert_eq!(result.len(), 5);
    let starts: Vec<_> = result
        .window_starts()
        .iter()
        .map(|t| t.as_calendar().unwrap())
        .collect();
    assert_eq!(starts[0], date(2000, 1, 1));
    for pair in starts.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= Duration::days(365) && gap <= Duration::days(366),
            "gap {gap}"
        );
    }
    for row in result.iter() {
        assert_eq!(row.result.n, 12);
        assert_eq!(row.result.trend, TrendDirection::Increasing);
        assert_eq!(
            row.window_end.as_calendar().unwrap(),
            row.window_start
                .as_calendar()
                .unwrap()
                .checked_add_months(chrono::Months::new(12))
                .unwrap()
        );
    }
}

#[test]
fn test_overlapping_calendar_windows() {
    let series = monthly_index_series(2000, 36);
    let window = RollingWindow::Offset(CalendarOffset::years(1).unwrap());
    let step = RollingWindow::Offset(CalendarOffset::months(6).unwrap());
    let result = rolling_trend_test(&series, window, Some(step), 10, &TrendConfig::default()).unwrap();

    // Starts every six months; the window from July 2002 holds six points
    assert_eq!(result.len(), 5);
    assert_eq!(
        result.rows()[1].window_start,
        Timestamp::Calendar(date(2000, 7, 1))
    );
}

#[test]
fn test_rolling_seasonal_analyzer() {
    let mut times = Vec::new();
    let mut values = Vec::new();
    for (i, dt) in monthly_dates(2000, 72).into_iter().enumerate() {
        times.push(dt);
        // seasonal cycle on top of a slow rise
        let month = (i % 12) as f64;
        values.push(0.1 * i as f64 + if month < 6.0 { month } else { 12.0 - month });
    }
    let series = TimeSeries::calendar(&times, &exact_values(&values)).unwrap();

    let test = SeasonalMannKendallTest::new(Seasonality::monthly(), TrendConfig::default());
    let config = RollingConfig::new(RollingWindow::Offset(CalendarOffset::years(3).unwrap()));
    let result = RollingAnalyzer::new(test, config).run(&series).unwrap();

    assert_eq!(result.len(), 2);
    for row in result.iter() {
        assert_eq!(row.result.s, 12 * 3);
        assert!(row.result.h);
    }
    assert_eq!(result.significant().count(), 2);
}

#[test]
fn test_compare_periods_with_one_point_before() {
    let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let series = TimeSeries::numeric(&times, &exact_values(&values)).unwrap();

    let comparison =
        compare_periods(&series, Timestamp::Numeric(1.0), &TrendConfig::default()).unwrap();
    assert_eq!(comparison.warnings.len(), 1);
    assert!(matches!(
        comparison.warnings[0],
        ComparisonWarning::InsufficientData {
            side: PeriodSide::Before,
            n: 1,
            ..
        }
    ));
    assert_eq!(comparison.before.trend, TrendDirection::Indeterminate);
    assert_eq!(comparison.after.n, 9);
    assert!(comparison.after.h);

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["before"]["trend"], "indeterminate");
    assert!(json["before"]["slope"].is_null());
}

#[test]
fn test_compare_calendar_breakpoint() {
    let series = monthly_index_series(2000, 48);
    let comparison = compare_periods(
        &series,
        Timestamp::Calendar(date(2002, 1, 1)),
        &TrendConfig::default().with_slope_scaling(trend_core::TimeUnit::Year),
    )
    .unwrap();
    assert!(comparison.warnings.is_empty());
    assert_eq!(comparison.before.n, 24);
    assert_eq!(comparison.after.n, 24);
    assert!(comparison.slope_change().abs() < 0.5);
}

#[test]
fn test_compare_with_seasonal_test() {
    let series = monthly_index_series(2000, 48);
    let test = SeasonalMannKendallTest::new(Seasonality::quarterly(), TrendConfig::default());
    let comparison =
        compare_periods_with(&test, &series, Timestamp::Calendar(date(2002, 1, 1))).unwrap();
    // two cycles per side: each quarter holds one increasing pair
    assert_eq!(comparison.before.s, 4);
    assert_eq!(comparison.after.s, 4);
}
