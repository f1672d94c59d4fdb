//! Statistical imputation.
//!
//! Resolves mean, median, mode and constant fill values for a column and
//! writes them into its missing cells.

use crate::error::{CleaningError, Result};
use crate::planner::{FillMethod, FillValue};
use crate::utils::{
    ColumnKind, fill_numeric_missing, fill_text_missing, present_numbers, present_text_values,
    text_mode,
};
use polars::prelude::*;
use tracing::warn;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Compute the fill value of one method on the current data.
    ///
    /// Returns [`CleaningError::StatisticUnavailable`] when the column has no
    /// values to compute the statistic from, or the statistic does not apply
    /// to the column kind.
    pub fn resolve(series: &Series, kind: ColumnKind, method: &FillMethod) -> Result<FillValue> {
        let column = series.name().as_str();

        match (method, kind) {
            (FillMethod::Mean, ColumnKind::Numeric) => {
                present_numbers(series)?
                    .mean()
                    .map(FillValue::Number)
                    .ok_or_else(|| CleaningError::statistic(column, "mean"))
            }
            (FillMethod::Median, ColumnKind::Numeric) => {
                present_numbers(series)?
                    .median()
                    .map(FillValue::Number)
                    .ok_or_else(|| CleaningError::statistic(column, "median"))
            }
            (FillMethod::Mode, ColumnKind::Text | ColumnKind::Unknown) => {
                let values = present_text_values(series)?;
                text_mode(&values)
                    .map(FillValue::Text)
                    .ok_or_else(|| CleaningError::statistic(column, "mode"))
            }
            (FillMethod::Constant(value), _) => Ok(value.clone()),
            (method, kind) => Err(CleaningError::statistic(
                column,
                format!("{} for {} column", method.label(), kind.as_str()),
            )),
        }
    }

    /// Resolve the first method of `chain` that succeeds.
    ///
    /// Each failure is logged at warn level before moving on. Returns `None`
    /// only if every method fails.
    pub fn resolve_chain(
        series: &Series,
        kind: ColumnKind,
        chain: &[FillMethod],
    ) -> Option<(FillMethod, FillValue)> {
        for method in chain {
            match Self::resolve(series, kind, method) {
                Ok(value) => return Some((method.clone(), value)),
                Err(e) => warn!(
                    "Fill method '{}' unavailable for '{}', trying next: {}",
                    method.label(),
                    series.name(),
                    e
                ),
            }
        }
        None
    }

    /// Write `value` into every missing cell (null, NaN or blank).
    ///
    /// Numeric columns filled with a number become Float64; everything else
    /// becomes a String column.
    pub fn apply(series: &Series, kind: ColumnKind, value: &FillValue) -> Result<Series> {
        let filled = match (kind, value) {
            (ColumnKind::Numeric, FillValue::Number(n)) => fill_numeric_missing(series, *n)?,
            (_, FillValue::Number(n)) => fill_text_missing(series, &n.to_string())?,
            (_, FillValue::Text(s)) => fill_text_missing(series, s)?,
        };
        Ok(filled)
    }
}
