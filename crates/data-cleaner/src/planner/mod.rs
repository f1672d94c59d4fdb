//! Cleaning plan decisions.
//!
//! The planner turns a [`TableProfile`] and a [`CleaningConfig`] into a
//! per-column [`CleaningPlan`] without touching the data. The same plan
//! drives both the preview and the executor.

mod fallback;
mod preview;

pub use fallback::{FillMethod, FillValue, fallback_chain, is_high_missing};
pub use preview::{CleaningPreview, ColumnMissingAnalysis, FileInfo, PreviewSummary, SourceInfo};

use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::StatisticalImputer;
use crate::profiler::drop_duplicate_rows;
use crate::types::{Table, TableProfile};
use crate::utils::{ColumnKind, missing_mask, round1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-column decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAction {
    Drop,
    FillMean,
    FillMedian,
    FillMode,
    FillConstant(FillValue),
    NoAction,
}

impl ColumnAction {
    /// The fill method behind a fill action.
    pub fn fill_method(&self) -> Option<FillMethod> {
        match self {
            ColumnAction::FillMean => Some(FillMethod::Mean),
            ColumnAction::FillMedian => Some(FillMethod::Median),
            ColumnAction::FillMode => Some(FillMethod::Mode),
            ColumnAction::FillConstant(value) => Some(FillMethod::Constant(value.clone())),
            ColumnAction::Drop | ColumnAction::NoAction => None,
        }
    }

    pub fn is_fill(&self) -> bool {
        self.fill_method().is_some()
    }
}

impl From<FillMethod> for ColumnAction {
    fn from(method: FillMethod) -> Self {
        match method {
            FillMethod::Mean => ColumnAction::FillMean,
            FillMethod::Median => ColumnAction::FillMedian,
            FillMethod::Mode => ColumnAction::FillMode,
            FillMethod::Constant(value) => ColumnAction::FillConstant(value),
        }
    }
}

/// Plan entry for one column, keyed by its disambiguated name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub action: ColumnAction,
    /// Missing percentage the decision was made on, over deduplicated rows.
    pub missing_percentage: f64,
    /// Methods to try, in order, if the planned fill cannot be computed at
    /// execution time.
    pub fallback: Vec<FillMethod>,
    /// Lower-case text values after trimming.
    pub normalize_case: bool,
}

/// Renaming of a repeated column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    /// Position of the column in the table.
    pub index: usize,
    pub original: String,
    pub renamed: String,
}

/// Ordered per-column decisions plus dataset-level steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningPlan {
    pub columns: Vec<PlannedColumn>,
    pub renames: Vec<ColumnRename>,
    pub deduplicate_rows: bool,
}

impl CleaningPlan {
    /// Look up a column entry by disambiguated name.
    pub fn column(&self, name: &str) -> Option<&PlannedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn columns_to_drop(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.action == ColumnAction::Drop)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn columns_to_fill(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.action.is_fill())
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Planner output.
#[derive(Debug, Clone, Serialize)]
pub struct PlannerOutput {
    pub plan: CleaningPlan,
    /// Human-readable lines, one per rename, drop and fill, plus the
    /// deduplication line when duplicate rows exist.
    pub predicted_actions: Vec<String>,
}

/// Decides what to do with every column.
pub struct CleaningPlanner;

impl CleaningPlanner {
    /// Build a cleaning plan.
    ///
    /// The profile must come from the same table. The configuration is
    /// validated first; an invalid one is rejected before any decision.
    ///
    /// Drop and fill decisions use missing rates over the rows that survive
    /// deduplication, since the executor removes duplicate rows before filling.
    pub fn plan(table: &Table, profile: &TableProfile, config: &CleaningConfig) -> Result<PlannerOutput> {
        config.validate()?;

        let names = table.unique_column_names();
        if profile.columns.len() != names.len() {
            return Err(CleaningError::InvalidInput(format!(
                "profile has {} columns, table has {}",
                profile.columns.len(),
                names.len()
            )));
        }

        let mut predicted_actions = Vec::new();

        let renames: Vec<ColumnRename> = table
            .column_names()
            .into_iter()
            .zip(&names)
            .enumerate()
            .filter(|(_, (original, renamed))| original != *renamed)
            .map(|(index, (original, renamed))| ColumnRename {
                index,
                original,
                renamed: renamed.clone(),
            })
            .collect();
        for rename in &renames {
            predicted_actions.push(format!(
                "Rename duplicate column '{}' to '{}'",
                rename.original, rename.renamed
            ));
        }

        let deduped = drop_duplicate_rows(&table.to_dataframe()?)?;

        let mut columns = Vec::with_capacity(names.len());
        for name in &names {
            let column_profile = profile
                .get(name)
                .ok_or_else(|| CleaningError::ColumnNotFound(name.clone()))?;
            let kind = column_profile.kind;
            let series = deduped.column(name)?.as_materialized_series();
            let missing_count = missing_mask(series, kind)?.into_iter().filter(|m| *m).count();
            let missing_pct = if series.is_empty() {
                0.0
            } else {
                round1(missing_count as f64 / series.len() as f64 * 100.0)
            };

            let (action, fallback) = if missing_pct / 100.0 > config.missing_threshold {
                predicted_actions.push(format!("Drop column '{}' ({:.1}% missing)", name, missing_pct));
                (ColumnAction::Drop, Vec::new())
            } else if !config.fill_strategy.fills() || missing_count == 0 {
                (ColumnAction::NoAction, Vec::new())
            } else {
                let high = is_high_missing(missing_pct);
                let chain = fallback_chain(kind, high);
                match StatisticalImputer::resolve_chain(series, kind, &chain) {
                    Some((method, _)) => {
                        predicted_actions.push(format!(
                            "Fill missing values in '{}' using {}",
                            name,
                            fill_label(&method, high)
                        ));
                        let rest = chain
                            .iter()
                            .skip_while(|m| **m != method)
                            .skip(1)
                            .cloned()
                            .collect();
                        (ColumnAction::from(method), rest)
                    }
                    // Chains end in a constant, so this only happens for an
                    // empty chain.
                    None => (ColumnAction::NoAction, Vec::new()),
                }
            };

            let normalize_case = column_profile.mixed_capitalization && action != ColumnAction::Drop;

            debug!(
                "Planned {:?} for column '{}' ({:.1}% missing after deduplication)",
                action, name, missing_pct
            );

            columns.push(PlannedColumn {
                name: name.clone(),
                kind,
                action,
                missing_percentage: missing_pct,
                fallback,
                normalize_case,
            });
        }

        let duplicates = profile.overview.duplicate_row_count;
        if duplicates > 0 {
            predicted_actions.push(format!("Remove {} duplicate rows", duplicates));
        }

        let plan = CleaningPlan {
            columns,
            renames,
            deduplicate_rows: true,
        };

        info!(
            "Planned cleaning: {} to drop, {} to fill, {} renames",
            plan.columns_to_drop().len(),
            plan.columns_to_fill().len(),
            plan.renames.len()
        );

        Ok(PlannerOutput {
            plan,
            predicted_actions,
        })
    }
}

/// Preview text for a fill method, marking the high-missing variant.
pub(crate) fn fill_label(method: &FillMethod, high_missing: bool) -> String {
    if high_missing {
        format!("{} (high missing rate)", method.label())
    } else {
        method.label()
    }
}
