//! Shared utilities for the cleaning engine.
//!
//! This module contains the value-level helpers the profiler, planner and
//! executor all rely on, so that "missing", "number" and "mode" mean the same
//! thing in every stage.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Column Kind
// =============================================================================

/// Semantic kind of a column, assigned once during profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// String or categorical values
    Text,
    /// Anything else (booleans, dates, nested types)
    Unknown,
}

impl ColumnKind {
    /// Derive the kind from a polars dtype.
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
            ColumnKind::Text
        } else {
            ColumnKind::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Unknown => "unknown",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Value Utilities
// =============================================================================

/// Whether a string value counts as missing (empty or whitespace only).
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Try to parse a string as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to one decimal place.
#[inline]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// =============================================================================
// Series Accessors
// =============================================================================

/// Values of a numeric series as `f64`, with nulls and NaN as `None`.
pub fn numeric_cells(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let ca = float_series.f64()?;
    Ok(ca
        .into_iter()
        .map(|v| v.filter(|val| !val.is_nan()))
        .collect())
}

/// Present values of a numeric series as Float64, nulls and NaN removed.
pub fn present_numbers(series: &Series) -> PolarsResult<Float64Chunked> {
    let float_series = series.cast(&DataType::Float64)?;
    let ca = float_series.f64()?;
    Ok(ca.filter(&ca.is_not_nan())?.drop_nulls())
}

/// Values of any series rendered as strings, with nulls as `None`.
///
/// Blank strings are returned as-is; callers decide whether they are missing.
pub fn text_cells(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    if let Ok(str_series) = series.cast(&DataType::String)
        && let Ok(ca) = str_series.str()
    {
        return Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect());
    }

    // Nested dtypes do not cast to String; fall back to the display form.
    let mut cells = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        match series.get(i)? {
            AnyValue::Null => cells.push(None),
            value => cells.push(Some(format!("{}", value))),
        }
    }
    Ok(cells)
}

/// Missing mask of a series: null, NaN, or blank string.
pub fn missing_mask(series: &Series, kind: ColumnKind) -> PolarsResult<Vec<bool>> {
    match kind {
        ColumnKind::Numeric => Ok(numeric_cells(series)?
            .into_iter()
            .map(|v| v.is_none())
            .collect()),
        ColumnKind::Text | ColumnKind::Unknown => Ok(text_cells(series)?
            .into_iter()
            .map(|v| v.as_deref().is_none_or(is_blank))
            .collect()),
    }
}

/// Trimmed non-missing text values of a series.
pub fn present_text_values(series: &Series) -> PolarsResult<Vec<String>> {
    Ok(text_cells(series)?
        .into_iter()
        .flatten()
        .filter(|v| !is_blank(v))
        .map(|v| v.trim().to_string())
        .collect())
}

// =============================================================================
// Statistics
// =============================================================================

/// Most frequent value, ties broken by the lexicographically smallest value.
///
/// Returns `None` only when there are no values.
pub fn text_mode(values: &[String]) -> Option<String> {
    let mut value_counts: HashMap<&str, usize> = HashMap::new();
    for val in values {
        *value_counts.entry(val.as_str()).or_insert(0) += 1;
    }

    value_counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Replace missing values of a numeric series, producing a Float64 series.
pub fn fill_numeric_missing(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<Option<f64>> = numeric_cells(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Replace missing (null or blank) values of a series, producing a String series.
pub fn fill_text_missing(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<Option<String>> = text_cells(series)?
        .into_iter()
        .map(|v| match v {
            Some(s) if !is_blank(&s) => Some(s),
            _ => Some(fill_value.to_string()),
        })
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Column Names
// =============================================================================

/// Make column names unique by suffixing repeats with `_1`, `_2`, ...
///
/// The first occurrence keeps its name. Suffixes skip names that already
/// exist in the input so the result is always unique.
pub fn disambiguate_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut taken: HashSet<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let name = name.as_ref();
        if seen.insert(name) {
            result.push(name.to_string());
            continue;
        }

        let suffix = next_suffix.entry(name).or_insert(1);
        let mut candidate = format!("{}_{}", name, suffix);
        while taken.contains(&candidate) {
            *suffix += 1;
            candidate = format!("{}_{}", name, suffix);
        }
        *suffix += 1;
        taken.insert(candidate.clone());
        result.push(candidate);
    }

    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_kind_from_dtype() {
        assert_eq!(ColumnKind::from_dtype(&DataType::Int64), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_dtype(&DataType::Float32), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_dtype(&DataType::String), ColumnKind::Text);
        assert_eq!(ColumnKind::from_dtype(&DataType::Boolean), ColumnKind::Unknown);
        assert_eq!(ColumnKind::from_dtype(&DataType::Date), ColumnKind::Unknown);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_present_numbers_drops_nulls_and_nan() {
        let series = Series::new("n".into(), &[Some(3.0), None, Some(f64::NAN), Some(1.0)]);
        let present = present_numbers(&series).unwrap();
        assert_eq!(present.into_iter().collect::<Vec<_>>(), vec![Some(3.0), Some(1.0)]);

        let ints = Series::new("i".into(), &[Some(1i64), None]);
        assert_eq!(present_numbers(&ints).unwrap().len(), 1);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.66), 66.7);
    }

    #[test]
    fn test_missing_mask_counts_blanks_and_nulls() {
        let series = Series::new("s".into(), &[Some("a"), None, Some("  "), Some("")]);
        let mask = missing_mask(&series, ColumnKind::Text).unwrap();
        assert_eq!(mask, vec![false, true, true, true]);

        let numbers = Series::new("n".into(), &[Some(1.0), None, Some(f64::NAN)]);
        let mask = missing_mask(&numbers, ColumnKind::Numeric).unwrap();
        assert_eq!(mask, vec![false, true, true]);
    }

    #[test]
    fn test_text_mode_is_deterministic_on_ties() {
        let values: Vec<String> = ["b", "a", "b", "a", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(text_mode(&values), Some("a".to_string()));

        let values: Vec<String> = ["x", "y", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(text_mode(&values), Some("y".to_string()));

        assert_eq!(text_mode(&[]), None);
    }

    #[test]
    fn test_fill_numeric_missing() {
        let series = Series::new("n".into(), &[Some(10i64), None, Some(20)]);
        let filled = fill_numeric_missing(&series, 15.0).unwrap();
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 15.0);
    }

    #[test]
    fn test_fill_text_missing_replaces_blanks() {
        let series = Series::new("s".into(), &[Some("a"), None, Some(" ")]);
        let filled = fill_text_missing(&series, "Unknown").unwrap();
        let values = text_cells(&filled).unwrap();
        assert_eq!(
            values,
            vec![
                Some("a".to_string()),
                Some("Unknown".to_string()),
                Some("Unknown".to_string())
            ]
        );
    }

    #[test]
    fn test_disambiguate_names() {
        assert_eq!(
            disambiguate_names(&["age", "name", "age", "age"]),
            vec!["age", "name", "age_1", "age_2"]
        );
        // An existing "age_1" is not reused.
        assert_eq!(
            disambiguate_names(&["age", "age_1", "age"]),
            vec!["age", "age_1", "age_2"]
        );
        assert_eq!(disambiguate_names(&["a", "b"]), vec!["a", "b"]);
    }
}
