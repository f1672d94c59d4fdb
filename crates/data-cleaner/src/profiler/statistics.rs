//! Statistical checks for column profiling.

use crate::config::{IQR_MULTIPLIER, NUMERIC_LIKE_RATIO};
use crate::utils::parse_number;
use polars::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Count values outside the IQR bounds (linear-interpolated quartiles).
///
/// A column without spread (IQR = 0) never reports outliers.
pub(crate) fn count_outliers(values: &Float64Chunked) -> PolarsResult<usize> {
    let (Some(q1), Some(q3)) = (
        values.quantile(0.25, QuantileMethod::Linear)?,
        values.quantile(0.75, QuantileMethod::Linear)?,
    ) else {
        return Ok(0);
    };

    let iqr = q3 - q1;
    if iqr <= 0.0 {
        return Ok(0);
    }

    let lower_bound = q1 - IQR_MULTIPLIER * iqr;
    let upper_bound = q3 + IQR_MULTIPLIER * iqr;

    Ok(values.lt(lower_bound).num_trues() + values.gt(upper_bound).num_trues())
}

/// Distinct numeric values.
pub(crate) fn distinct_numbers(values: &Float64Chunked) -> PolarsResult<usize> {
    values.clone().into_series().n_unique()
}

/// Distinct text values.
pub(crate) fn distinct_texts(values: &[String]) -> PolarsResult<usize> {
    Series::new(PlSmallStr::EMPTY, values).n_unique()
}

/// True if two distinct values differ only by casing ("Yes" and "yes").
pub(crate) fn has_mixed_capitalization(values: &[String]) -> bool {
    let mut variants: HashMap<String, &str> = HashMap::new();
    for val in values {
        match variants.entry(val.to_lowercase()) {
            Entry::Occupied(entry) => {
                if *entry.get() != val.as_str() {
                    return true;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(val.as_str());
            }
        }
    }
    false
}

/// True if the share of values that parse as numbers exceeds the numeric-like ratio.
pub(crate) fn is_numeric_like(values: &[String]) -> bool {
    if values.is_empty() {
        return false;
    }
    let parsed = values.iter().filter(|v| parse_number(v).is_some()).count();
    parsed as f64 / values.len() as f64 > NUMERIC_LIKE_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn numbers(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("n".into(), values)
    }

    // ==================== count_outliers tests ====================

    #[test]
    fn test_count_outliers_known_fixture() {
        // Q1 = 2, Q3 = 4, IQR = 2, upper bound = 7: only 100 is flagged.
        assert_eq!(count_outliers(&numbers(&[1.0, 2.0, 3.0, 4.0, 100.0])).unwrap(), 1);
    }

    #[test]
    fn test_count_outliers_unsorted_both_tails() {
        let values = [15.0, -100.0, 10.0, 12.0, 200.0, 11.0, 14.0, 13.0];
        assert_eq!(count_outliers(&numbers(&values)).unwrap(), 2);
    }

    #[test]
    fn test_count_outliers_constant_column() {
        assert_eq!(count_outliers(&numbers(&[5.0, 5.0, 5.0, 5.0])).unwrap(), 0);
    }

    #[test]
    fn test_count_outliers_zero_iqr_with_stray_value() {
        // Q1 = Q3 = 5, so the stray value is not flagged.
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 9.0];
        assert_eq!(count_outliers(&numbers(&values)).unwrap(), 0);
    }

    #[test]
    fn test_count_outliers_empty() {
        assert_eq!(count_outliers(&numbers(&[])).unwrap(), 0);
    }

    #[test]
    fn test_count_outliers_no_outlier() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(count_outliers(&numbers(&values)).unwrap(), 0);
    }

    // ==================== text checks ====================

    #[test]
    fn test_mixed_capitalization() {
        assert!(has_mixed_capitalization(&strings(&["Yes", "yes", "No"])));
        assert!(!has_mixed_capitalization(&strings(&["Yes", "Yes", "No"])));
        assert!(!has_mixed_capitalization(&[]));
    }

    #[test]
    fn test_numeric_like() {
        assert!(is_numeric_like(&strings(&["1", "2.5", "3", "-4"])));
        assert!(!is_numeric_like(&strings(&["1", "2", "three"])));
        assert!(!is_numeric_like(&[]));
    }

    #[test]
    fn test_distinct_counts() {
        assert_eq!(distinct_numbers(&numbers(&[1.0, 1.0, 2.0])).unwrap(), 2);
        assert_eq!(distinct_texts(&strings(&["a", "A", "a"])).unwrap(), 2);
    }
}
