//! Common test utilities for trend-analysis tests
#![allow(dead_code)]

use chrono::{Months, NaiveDate, NaiveDateTime};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use trend_core::{CensoredValue, RawValue, TimeSeries};

/// Midnight on a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// First of the month for `count` consecutive months starting at January of `year`
pub fn monthly_dates(year: i32, count: usize) -> Vec<NaiveDateTime> {
    let start = date(year, 1, 1);
    (0..count)
        .map(|i| start.checked_add_months(Months::new(i as u32)).unwrap())
        .collect()
}

pub fn exact_values(values: &[f64]) -> Vec<CensoredValue> {
    values.iter().map(|&v| CensoredValue::exact(v).unwrap()).collect()
}

/// Monthly calendar series with values `0, 1, 2, ...`
pub fn monthly_index_series(year: i32, count: usize) -> TimeSeries {
    let values: Vec<f64> = (0..count).map(|i| i as f64).collect();
    TimeSeries::calendar(&monthly_dates(year, count), &exact_values(&values)).unwrap()
}

/// Series on a numeric index axis parsed from mixed raw input
pub fn indexed_raw_series(raw: &[RawValue]) -> TimeSeries {
    let times: Vec<f64> = (0..raw.len()).map(|i| i as f64).collect();
    TimeSeries::parse_numeric(&times, raw).unwrap()
}

/// Linear trend plus Gaussian noise, with values below `detection_limit`
/// reported as `<detection_limit`
pub fn synthetic_censored_series(
    n: usize,
    slope: f64,
    noise_sd: f64,
    detection_limit: f64,
    seed: u64,
) -> TimeSeries {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, noise_sd).unwrap();
    let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let values: Vec<CensoredValue> = times
        .iter()
        .map(|&t| {
            let x = 2.0 + slope * t + noise.sample(&mut rng);
            if x < detection_limit {
                CensoredValue::less_than(detection_limit).unwrap()
            } else {
                CensoredValue::exact(x).unwrap()
            }
        })
        .collect();
    TimeSeries::numeric(&times, &values).unwrap()
}
