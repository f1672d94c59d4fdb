//! Cleaning executor.
//!
//! Applies a [`CleaningPlan`] to a table, in order:
//! 1. rename duplicate columns
//! 2. drop columns
//! 3. drop exact-duplicate rows, keeping the first
//! 4. fill missing values
//! 5. normalize column names
//! 6. normalize text values
//!
//! Only steps that change the data are logged, so executing a fresh plan on
//! already-cleaned data yields the same table and an empty log.

use crate::cleaner::{normalize_column_names, normalize_text_values};
use crate::error::{CleaningError, Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::planner::{
    CleaningPlan, ColumnAction, FillMethod, PlannedColumn, fallback_chain, is_high_missing,
};
use crate::profiler::drop_duplicate_rows;
use crate::types::{ActionType, CleaningAction, CleaningResult, Table};
use crate::utils::{ColumnKind, missing_mask, round1};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Executes cleaning plans.
pub struct CleaningExecutor;

impl CleaningExecutor {
    /// Apply `plan` to `table`. The input table is not modified.
    pub fn execute(table: &Table, plan: &CleaningPlan) -> Result<CleaningResult> {
        let rows_before = table.height();
        let mut actions = Vec::new();

        info!("Executing cleaning plan on {} rows...", rows_before);

        // 1. Rename duplicate columns
        let mut df = Self::rename_duplicates(table, plan, &mut actions)?;

        // 2. Drop columns
        let columns_dropped = Self::drop_columns(&mut df, plan, &mut actions)?;

        // 3. Drop duplicate rows
        if plan.deduplicate_rows {
            let removed = Self::drop_duplicate_rows(&mut df)?;
            if removed > 0 {
                actions.push(CleaningAction::new(
                    ActionType::DuplicatesRemoved,
                    "dataset",
                    format!("Removed {} duplicate rows", removed),
                ));
            }
        }

        // 4. Fill missing values
        let columns_filled = Self::fill_missing(&mut df, plan, &mut actions)?;

        // 5. Normalize column names
        let case_columns: HashSet<String> = plan
            .columns
            .iter()
            .filter(|c| c.normalize_case)
            .map(|c| c.name.clone())
            .collect();
        let lowercase: Vec<bool> = df
            .get_column_names()
            .iter()
            .map(|name| case_columns.contains(name.as_str()))
            .collect();
        Self::normalize_names(&mut df, &mut actions)?;

        // 6. Normalize text values
        Self::normalize_text(&mut df, &lowercase, &mut actions)?;

        // Filling and re-casing can make rows identical again.
        if plan.deduplicate_rows {
            let removed = Self::drop_duplicate_rows(&mut df)?;
            if removed > 0 {
                actions.push(CleaningAction::new(
                    ActionType::DuplicatesRemoved,
                    "dataset",
                    format!("Removed {} rows that became duplicates after cleaning", removed),
                ));
            }
        }

        let rows_after = df.height();
        info!(
            "Cleaning complete: {} actions, {} -> {} rows, {} columns",
            actions.len(),
            rows_before,
            rows_after,
            df.width()
        );

        Ok(CleaningResult {
            cleaned: df,
            actions,
            columns_dropped,
            columns_filled,
            rows_before,
            rows_after,
        })
    }

    fn rename_duplicates(
        table: &Table,
        plan: &CleaningPlan,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<DataFrame> {
        let mut names = table.column_names();

        for rename in &plan.renames {
            match names.get_mut(rename.index) {
                Some(name) if *name == rename.original => {
                    *name = rename.renamed.clone();
                    actions.push(CleaningAction::new(
                        ActionType::ColumnRenamed,
                        &rename.renamed,
                        format!(
                            "Renamed duplicate column '{}' to '{}'",
                            rename.original, rename.renamed
                        ),
                    ));
                }
                _ => {
                    return Err(CleaningError::InvalidInput(format!(
                        "rename of '{}' at position {} does not match the table",
                        rename.original, rename.index
                    )));
                }
            }
        }

        table
            .to_dataframe_with_names(&names)
            .context("Failed to disambiguate column names")
    }

    fn drop_columns(
        df: &mut DataFrame,
        plan: &CleaningPlan,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<Vec<String>> {
        let to_drop = plan.columns_to_drop();

        for column in plan.columns.iter().filter(|c| c.action == ColumnAction::Drop) {
            let (name, pct) = (&column.name, column.missing_percentage);
            if df.column(name).is_err() {
                return Err(CleaningError::ColumnNotFound(name.clone()));
            }

            debug!("Dropping column '{}' ({:.1}% missing)", name, pct);
            actions.push(CleaningAction::new(
                ActionType::ColumnRemoved,
                name,
                format!("Dropped column '{}' ({:.1}% missing)", name, pct),
            ));
        }

        if !to_drop.is_empty() {
            let cols_ref: Vec<PlSmallStr> = to_drop.iter().map(|s| s.as_str().into()).collect();
            *df = df.drop_many(cols_ref);
        }

        Ok(to_drop)
    }

    /// Remove repeated rows, keeping the first. Returns the number removed.
    fn drop_duplicate_rows(df: &mut DataFrame) -> Result<usize> {
        let deduped = drop_duplicate_rows(df)?;
        let removed = df.height() - deduped.height();
        if removed > 0 {
            debug!("Removed {} duplicate rows", removed);
            *df = deduped;
        }
        Ok(removed)
    }

    fn fill_missing(
        df: &mut DataFrame,
        plan: &CleaningPlan,
        actions: &mut Vec<CleaningAction>,
    ) -> Result<Vec<String>> {
        let mut filled_columns = Vec::new();

        for column in plan.columns.iter().filter(|c| c.action.is_fill()) {
            let series = df
                .column(&column.name)
                .map_err(|_| CleaningError::ColumnNotFound(column.name.clone()))?
                .as_materialized_series()
                .clone();

            // The data decides the kind; a plan built on another version of
            // the table must not push numeric fills into text columns.
            let kind = ColumnKind::from_dtype(series.dtype());
            let missing = missing_mask(&series, kind)?.into_iter().filter(|m| *m).count();
            if missing == 0 {
                continue;
            }

            let chain = if kind == column.kind {
                fill_chain(column)
            } else {
                let pct = round1(missing as f64 / series.len() as f64 * 100.0);
                warn!(
                    "Column '{}' was planned as {:?} but holds {:?} data, re-deriving its fill",
                    column.name, column.kind, kind
                );
                fallback_chain(kind, is_high_missing(pct))
            };

            let Some((method, value)) = StatisticalImputer::resolve_chain(&series, kind, &chain) else {
                warn!("No fill value available for '{}', leaving it unchanged", column.name);
                continue;
            };

            let filled = StatisticalImputer::apply(&series, kind, &value)
                .context(format!("Failed to fill column '{}'", column.name))?;
            df.replace(&column.name, filled)?;

            let description = match &method {
                FillMethod::Constant(_) => format!(
                    "Filled {} missing values in '{}' with '{}'",
                    missing, column.name, value
                ),
                _ => format!(
                    "Filled {} missing values in '{}' with {} ({})",
                    missing,
                    column.name,
                    method.label(),
                    value
                ),
            };
            debug!("{}", description);
            actions.push(CleaningAction::new(ActionType::ValueImputed, &column.name, description));
            filled_columns.push(column.name.clone());
        }

        Ok(filled_columns)
    }

    fn normalize_names(df: &mut DataFrame, actions: &mut Vec<CleaningAction>) -> Result<()> {
        let current: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let normalized = normalize_column_names(&current);

        let changes: Vec<String> = current
            .iter()
            .zip(&normalized)
            .filter(|(before, after)| before != after)
            .map(|(before, after)| format!("'{}' -> '{}'", before, after))
            .collect();
        if changes.is_empty() {
            return Ok(());
        }

        df.set_column_names(normalized.iter().map(|s| s.as_str()))?;
        actions.push(CleaningAction::new(
            ActionType::NamesNormalized,
            "dataset",
            format!("Normalized column names: {}", changes.join(", ")),
        ));
        Ok(())
    }

    fn normalize_text(
        df: &mut DataFrame,
        lowercase: &[bool],
        actions: &mut Vec<CleaningAction>,
    ) -> Result<()> {
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

        for (name, &lower) in names.iter().zip(lowercase) {
            let series = df.column(name)?.as_materialized_series();
            let Some((cleaned, changed)) = normalize_text_values(series, lower)? else {
                continue;
            };
            df.replace(name, cleaned)?;

            let description = if lower {
                format!("Trimmed and lower-cased {} values in '{}'", changed, name)
            } else {
                format!("Trimmed whitespace in {} values of '{}'", changed, name)
            };
            actions.push(CleaningAction::new(ActionType::ValueCleaned, name, description));
        }

        Ok(())
    }
}

/// The planned fill method followed by its remaining fallbacks.
fn fill_chain(column: &PlannedColumn) -> Vec<FillMethod> {
    column
        .action
        .fill_method()
        .into_iter()
        .chain(column.fallback.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningConfig;
    use crate::planner::{CleaningPlanner, FillValue};
    use crate::profiler::DataProfiler;
    use crate::utils::text_cells;
    use pretty_assertions::assert_eq;

    fn clean(table: &Table, config: CleaningConfig) -> CleaningResult {
        let profile = DataProfiler::profile(table);
        let output = CleaningPlanner::plan(table, &profile, &config).unwrap();
        CleaningExecutor::execute(table, &output.plan).unwrap()
    }

    fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_mean_fill() {
        let table = Table::new(vec![
            Series::new("id".into(), &[1i64, 2, 3, 4]),
            Series::new("score".into(), &[Some(10i64), None, Some(20), None]),
        ])
        .unwrap();

        let result = clean(&table, CleaningConfig::default());

        assert_eq!(
            f64_column(&result.cleaned, "score"),
            vec![Some(10.0), Some(15.0), Some(20.0), Some(15.0)]
        );
        assert_eq!(result.columns_filled, vec!["score"]);
        assert_eq!(
            result.action_descriptions(),
            vec!["Filled 2 missing values in 'score' with mean (15)"]
        );
    }

    #[test]
    fn test_duplicate_rows_removed_keeping_first() {
        let table = Table::new(vec![
            Series::new("id".into(), &[1i64, 2, 1, 3]),
            Series::new("name".into(), &["a", "b", "a", "c"]),
        ])
        .unwrap();

        let result = clean(&table, CleaningConfig::default());
        assert_eq!(result.rows_before, 4);
        assert_eq!(result.rows_after, 3);
        assert_eq!(result.action_descriptions(), vec!["Removed 1 duplicate rows"]);
    }

    #[test]
    fn test_renames_and_normalizes_names() {
        let table = Table::new(vec![
            Series::new("Full Name".into(), &["a", "b"]),
            Series::new("age".into(), &[1i64, 2]),
            Series::new("age".into(), &[3i64, 4]),
        ])
        .unwrap();

        let result = clean(&table, CleaningConfig::default());
        let names: Vec<String> = result
            .cleaned
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["full_name", "age", "age_1"]);
        assert_eq!(result.actions[0].action_type, ActionType::ColumnRenamed);
        assert_eq!(result.actions[1].action_type, ActionType::NamesNormalized);
    }

    #[test]
    fn test_mixed_capitalization_is_lowercased() {
        let table = Table::new(vec![
            Series::new("id".into(), &[1i64, 2, 3]),
            Series::new("answer".into(), &[" Yes", "yes", "No"]),
        ])
        .unwrap();

        let result = clean(&table, CleaningConfig::default());
        let answers = text_cells(result.cleaned.column("answer").unwrap().as_materialized_series())
            .unwrap();
        assert_eq!(
            answers,
            vec![Some("yes".to_string()), Some("yes".to_string()), Some("no".to_string())]
        );
    }

    #[test]
    fn test_fill_falls_back_at_execution_time() {
        // Planned as a mean fill, but no value is left to compute it from.
        let table = Table::new(vec![Series::new("n".into(), &[None::<f64>, None])]).unwrap();
        let plan = CleaningPlan {
            columns: vec![PlannedColumn {
                name: "n".to_string(),
                kind: ColumnKind::Numeric,
                action: ColumnAction::FillMean,
                missing_percentage: 100.0,
                fallback: vec![FillMethod::Median, FillMethod::Constant(FillValue::Number(0.0))],
                normalize_case: false,
            }],
            renames: vec![],
            deduplicate_rows: false,
        };

        let result = CleaningExecutor::execute(&table, &plan).unwrap();
        assert_eq!(f64_column(&result.cleaned, "n"), vec![Some(0.0), Some(0.0)]);
        assert_eq!(result.columns_filled, vec!["n"]);
    }

    #[test]
    fn test_fill_follows_current_dtype() {
        let id = || Series::new("id".into(), &[1i64, 2, 3]);
        let planned_on = Table::new(vec![
            id(),
            Series::new("v".into(), &[Some(1.0f64), None, Some(3.0)]),
        ])
        .unwrap();
        let profile = DataProfiler::profile(&planned_on);
        let output = CleaningPlanner::plan(&planned_on, &profile, &CleaningConfig::default()).unwrap();
        assert_eq!(output.plan.column("v").unwrap().action, ColumnAction::FillMean);

        // Same shape, but the column now holds text.
        let table = Table::new(vec![
            id(),
            Series::new("v".into(), &[Some("red"), None, Some("blue")]),
        ])
        .unwrap();
        let result = CleaningExecutor::execute(&table, &output.plan).unwrap();

        let values = text_cells(result.cleaned.column("v").unwrap().as_materialized_series()).unwrap();
        assert_eq!(
            values,
            vec![Some("red".to_string()), Some("blue".to_string()), Some("blue".to_string())]
        );
        assert_eq!(
            result.action_descriptions(),
            vec!["Filled 1 missing values in 'v' with mode (blue)"]
        );
    }

    #[test]
    fn test_missing_plan_column_is_an_error() {
        let table = Table::new(vec![Series::new("a".into(), &[1i64])]).unwrap();
        let plan = CleaningPlan {
            columns: vec![PlannedColumn {
                name: "b".to_string(),
                kind: ColumnKind::Numeric,
                action: ColumnAction::Drop,
                missing_percentage: 100.0,
                fallback: vec![],
                normalize_case: false,
            }],
            renames: vec![],
            deduplicate_rows: true,
        };

        let err = CleaningExecutor::execute(&table, &plan).unwrap_err();
        assert!(matches!(err, CleaningError::ColumnNotFound(name) if name == "b"));
    }

    #[test]
    fn test_cleaning_twice_is_a_noop() {
        let table = Table::new(vec![
            Series::new("Name".into(), &[Some("Ann"), Some("bob "), None, Some("Ann")]),
            Series::new("Score".into(), &[Some(1.0f64), None, Some(3.0), Some(1.0)]),
        ])
        .unwrap();

        let first = clean(&table, CleaningConfig::default());
        let second = clean(&Table::try_from(first.cleaned.clone()).unwrap(), CleaningConfig::default());

        assert!(second.actions.is_empty(), "{:?}", second.action_descriptions());
        assert!(second.cleaned.equals_missing(&first.cleaned));
    }
}
