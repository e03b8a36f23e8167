//! Utility functions for working with data slices

/// Sort data and return a new vector
///
/// Handles NaN values by placing them at the end.
///
/// # Examples
///
/// ```rust
/// use trend_core::utils::sorted;
///
/// let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
/// assert_eq!(sorted(&data), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
/// ```
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sort_in_place(&mut sorted);
    sorted
}

/// Sort a slice in place, NaN values last
pub fn sort_in_place(data: &mut [f64]) {
    data.sort_by(|a, b| match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.total_cmp(b),
    });
}

/// Median of already sorted data
///
/// Returns NaN for an empty slice. Even-length input averages the two
/// middle values.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Median of unsorted data
///
/// # Examples
///
/// ```rust
/// use trend_core::utils::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
/// assert!(median(&[]).is_nan());
/// ```
pub fn median(data: &[f64]) -> f64 {
    median_sorted(&sorted(data))
}

/// Calculate the mean of a slice
///
/// Returns 0.0 for empty slices.
///
/// # Examples
///
/// ```rust
/// use trend_core::utils::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
/// assert_eq!(mean(&[]), 0.0);
/// ```
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sorted_basic() {
        let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
        assert_eq!(sorted(&data), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_sorted_with_nan() {
        let data = vec![3.0, f64::NAN, 1.0, 2.0];
        let sorted_data = sorted(&data);
        assert_eq!(&sorted_data[..3], &[1.0, 2.0, 3.0]);
        assert!(sorted_data[3].is_nan());
    }

    #[test]
    fn test_sorted_preserves_original() {
        let data = vec![3.0, 1.0, 5.0, 2.0, 4.0];
        let original = data.clone();
        let _ = sorted(&data);
        assert_eq!(data, original);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
    }

    #[test]
    fn test_median_empty_is_nan() {
        assert!(median(&[]).is_nan());
        assert!(median_sorted(&[]).is_nan());
    }

    #[test]
    fn test_median_of_month_indices() {
        // Calendar year of month indices 0..12
        let first_year: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert_eq!(median(&first_year), 5.5);
    }

    proptest! {
        #[test]
        fn prop_median_within_range(data in proptest::collection::vec(-1e6_f64..1e6, 1..50)) {
            let m = median(&data);
            let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(m >= lo && m <= hi, "median {} outside [{}, {}]", m, lo, hi);
        }
    }

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(mean(&[-10.0, 10.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }
}
