//! Data profiling module for data-quality analysis.
//!
//! This module computes, for every column:
//! - Missing values (nulls and blank strings)
//! - Distinct values and IQR outliers
//! - Text formatting defects (mixed capitalization, numbers stored as text)
//!
//! and, for the dataset as a whole, duplicate rows and a cleanliness score.

mod duplicates;
mod statistics;

pub(crate) use duplicates::drop_duplicate_rows;

use crate::config::HIGH_MISSING_REASON_PCT;
use crate::types::{ColumnProfile, OverviewStats, Table, TableProfile};
use crate::utils::{ColumnKind, missing_mask, present_numbers, present_text_values, round1};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Weight of the clean-column fraction in the cleanliness score.
const COLUMN_WEIGHT: f64 = 0.4;

/// Weight of the cell-level quality product in the cleanliness score.
const CELL_WEIGHT: f64 = 0.6;

/// Data profiler for data-quality diagnostics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile a table.
    ///
    /// Profiling never fails: a statistic that cannot be computed for a column
    /// is recorded as 0/false and logged at debug level.
    pub fn profile(table: &Table) -> TableProfile {
        let row_count = table.height();
        let duplicate_names = table.duplicate_column_names();
        let names = table.unique_column_names();

        let columns: Vec<ColumnProfile> = table
            .columns()
            .iter()
            .zip(names)
            .map(|(series, name)| Self::profile_column(series, name, row_count, &duplicate_names))
            .collect();

        let duplicate_row_count = table
            .to_dataframe()
            .and_then(|df| Ok(duplicates::count_duplicate_rows(&df)?))
            .unwrap_or_else(|e| {
                debug!("Duplicate row detection failed: {}", e);
                0
            });

        let total_missing_values = columns.iter().map(|c| c.missing_count).sum();
        let total_outliers: usize = columns.iter().map(|c| c.outlier_count).sum();
        let clean_columns = columns.iter().filter(|c| !c.has_problem).count();

        let cleanliness_percentage = cleanliness_score(
            row_count,
            columns.len(),
            clean_columns,
            total_missing_values,
            duplicate_row_count,
            total_outliers,
        );

        info!(
            "Profiled {} rows x {} columns: {} missing values, {} duplicate rows, {:.1}% clean",
            row_count,
            columns.len(),
            total_missing_values,
            duplicate_row_count,
            cleanliness_percentage
        );

        TableProfile {
            overview: OverviewStats {
                row_count,
                column_count: columns.len(),
                total_missing_values,
                duplicate_row_count,
                cleanliness_percentage,
            },
            columns,
        }
    }

    fn profile_column(
        series: &Series,
        name: String,
        row_count: usize,
        duplicate_names: &HashSet<String>,
    ) -> ColumnProfile {
        let kind = ColumnKind::from_dtype(series.dtype());
        let dtype = format!("{}", series.dtype());

        let missing_count = recover(&name, "missing_count", || {
            Ok(missing_mask(series, kind)?.into_iter().filter(|m| *m).count())
        });
        let missing_percentage = if row_count > 0 {
            round1(missing_count as f64 / row_count as f64 * 100.0)
        } else {
            0.0
        };

        let mut unique_count = 0;
        let mut outlier_count = 0;
        let mut mixed_capitalization = false;
        let mut numeric_like = false;

        match kind {
            ColumnKind::Numeric => {
                if let Some(values) = recover(&name, "numeric_values", || {
                    present_numbers(series).map(Some)
                }) {
                    unique_count = recover(&name, "unique_count", || {
                        statistics::distinct_numbers(&values)
                    });
                    outlier_count = recover(&name, "outlier_count", || {
                        statistics::count_outliers(&values)
                    });
                }
            }
            ColumnKind::Text => {
                if let Some(values) = recover(&name, "text_values", || {
                    present_text_values(series).map(Some)
                }) {
                    unique_count = recover(&name, "unique_count", || {
                        statistics::distinct_texts(&values)
                    });
                    mixed_capitalization = statistics::has_mixed_capitalization(&values);
                    numeric_like = statistics::is_numeric_like(&values);
                }
            }
            ColumnKind::Unknown => {
                unique_count = recover(&name, "unique_count", || {
                    statistics::distinct_texts(&present_text_values(series)?)
                });
            }
        }

        let original_name = series.name().as_str();
        let duplicate_name = duplicate_names.contains(original_name);

        let mut reasons = Vec::new();
        if missing_percentage > HIGH_MISSING_REASON_PCT {
            reasons.push(format!("High missing rate: {:.1}%", missing_percentage));
        }
        if outlier_count > 0 {
            reasons.push(format!("{} potential outliers", outlier_count));
        }
        if mixed_capitalization {
            reasons.push("Inconsistent capitalization".to_string());
        }
        if duplicate_name {
            reasons.push(format!("Duplicate column name: {}", original_name));
        }

        debug!(
            "Column '{}' ({}): {} missing, {} unique, {} outliers",
            name,
            kind.as_str(),
            missing_count,
            unique_count,
            outlier_count
        );

        ColumnProfile {
            name,
            kind,
            dtype,
            missing_count,
            missing_percentage,
            unique_count,
            outlier_count,
            mixed_capitalization,
            numeric_like,
            duplicate_name,
            has_problem: !reasons.is_empty(),
            reasons,
        }
    }
}

/// Run a statistic, falling back to the default value when it fails.
fn recover<T: Default>(column: &str, statistic: &str, compute: impl FnOnce() -> PolarsResult<T>) -> T {
    compute().unwrap_or_else(|e| {
        debug!("Could not compute {} for column '{}': {}", statistic, column, e);
        T::default()
    })
}

/// Aggregate dataset quality score in `[0, 100]`, one decimal.
///
/// `100 * (0.4 * clean_columns/columns + 0.6 * (1 - missing) * (1 - duplicates) * (1 - outliers))`
/// where missing and outliers are ratios over all cells and duplicates a ratio over rows.
pub(crate) fn cleanliness_score(
    rows: usize,
    columns: usize,
    clean_columns: usize,
    missing_cells: usize,
    duplicate_rows: usize,
    outlier_cells: usize,
) -> f64 {
    let ratio = |part: usize, whole: usize| {
        if whole == 0 {
            0.0
        } else {
            (part as f64 / whole as f64).clamp(0.0, 1.0)
        }
    };

    let cells = rows * columns;
    let clean_fraction = if columns == 0 {
        1.0
    } else {
        clean_columns as f64 / columns as f64
    };
    let cell_quality = (1.0 - ratio(missing_cells, cells))
        * (1.0 - ratio(duplicate_rows, rows))
        * (1.0 - ratio(outlier_cells, cells));

    round1(100.0 * (COLUMN_WEIGHT * clean_fraction + CELL_WEIGHT * cell_quality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(columns: Vec<Series>) -> Table {
        Table::new(columns).unwrap()
    }

    #[test]
    fn test_profile_clean_table_scores_100() {
        let profile = DataProfiler::profile(&table(vec![
            Series::new("id".into(), &[1i64, 2, 3]),
            Series::new("name".into(), &["a", "b", "c"]),
        ]));

        assert_eq!(profile.overview.cleanliness_percentage, 100.0);
        assert_eq!(profile.overview.total_missing_values, 0);
        assert_eq!(profile.problem_columns().count(), 0);
    }

    #[test]
    fn test_profile_missing_values_include_blanks() {
        let profile = DataProfiler::profile(&table(vec![Series::new(
            "city".into(),
            &[Some("Paris"), None, Some("  "), Some("Rome")],
        )]));

        let city = profile.get("city").unwrap();
        assert_eq!(city.missing_count, 2);
        assert_eq!(city.missing_percentage, 50.0);
        assert_eq!(city.unique_count, 2);
        assert_eq!(city.reasons, vec!["High missing rate: 50.0%"]);
    }

    #[test]
    fn test_profile_outliers() {
        let profile = DataProfiler::profile(&table(vec![Series::new(
            "val".into(),
            &[1.0f64, 2.0, 3.0, 4.0, 100.0],
        )]));

        let val = profile.get("val").unwrap();
        assert_eq!(val.kind, ColumnKind::Numeric);
        assert_eq!(val.outlier_count, 1);
        assert!(val.has_problem);
        assert_eq!(val.reasons, vec!["1 potential outliers"]);
    }

    #[test]
    fn test_profile_mixed_capitalization() {
        let profile = DataProfiler::profile(&table(vec![Series::new(
            "answer".into(),
            &["Yes", "yes", "No"],
        )]));

        let answer = profile.get("answer").unwrap();
        assert!(answer.mixed_capitalization);
        assert_eq!(answer.reasons, vec!["Inconsistent capitalization"]);
    }

    #[test]
    fn test_profile_duplicate_column_names() {
        let profile = DataProfiler::profile(&table(vec![
            Series::new("age".into(), &[1i64, 2]),
            Series::new("age".into(), &[3i64, 4]),
        ]));

        assert_eq!(profile.columns.len(), 2);
        for key in ["age", "age_1"] {
            let column = profile.get(key).unwrap();
            assert!(column.duplicate_name);
            assert_eq!(column.reasons, vec!["Duplicate column name: age"]);
        }
    }

    #[test]
    fn test_profile_reason_order() {
        let profile = DataProfiler::profile(&table(vec![
            Series::new(
                "x".into(),
                &[Some(1.0f64), Some(2.0), Some(3.0), Some(4.0), Some(100.0), None, None],
            ),
            Series::new("x".into(), &[1i64, 1, 1, 1, 1, 1, 1]),
        ]));

        let x = profile.get("x").unwrap();
        assert_eq!(
            x.reasons,
            vec![
                "High missing rate: 28.6%",
                "1 potential outliers",
                "Duplicate column name: x"
            ]
        );
    }

    #[test]
    fn test_profile_duplicate_rows() {
        let profile = DataProfiler::profile(&table(vec![
            Series::new("a".into(), &[1i64, 1, 2]),
            Series::new("b".into(), &["x", "x", "y"]),
        ]));
        assert_eq!(profile.overview.duplicate_row_count, 1);
        assert!(profile.overview.cleanliness_percentage < 100.0);
    }

    #[test]
    fn test_profile_zero_rows() {
        let empty: [f64; 0] = [];
        let profile = DataProfiler::profile(&table(vec![Series::new("a".into(), &empty)]));

        assert_eq!(profile.overview.row_count, 0);
        assert_eq!(profile.get("a").unwrap().missing_percentage, 0.0);
        assert_eq!(profile.overview.cleanliness_percentage, 100.0);
    }

    #[test]
    fn test_profile_numeric_like_text() {
        let profile = DataProfiler::profile(&table(vec![Series::new(
            "amount".into(),
            &["1", "2", "3.5", "4"],
        )]));

        let amount = profile.get("amount").unwrap();
        assert!(amount.numeric_like);
        assert!(!amount.has_problem);
    }

    #[test]
    fn test_cleanliness_score() {
        assert_eq!(cleanliness_score(0, 0, 0, 0, 0, 0), 100.0);
        assert_eq!(cleanliness_score(10, 2, 2, 0, 0, 0), 100.0);
        // Half the columns clean, 10% of cells missing:
        // 100 * (0.4 * 0.5 + 0.6 * 0.9) = 74.0
        assert_eq!(cleanliness_score(10, 2, 1, 2, 0, 0), 74.0);
    }
}
