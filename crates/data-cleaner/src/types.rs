//! Core data types shared by the engine stages.

use crate::error::{CleaningError, Result};
use crate::utils::{ColumnKind, disambiguate_names};
use polars::prelude::*;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

// ============================================================================
// Table
// ============================================================================

/// An in-memory table as delivered by a loader.
///
/// Unlike a polars `DataFrame`, a `Table` may carry repeated column names;
/// they are disambiguated by the planner and executor before any per-column
/// processing. All columns have the same length.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Series>,
}

impl Table {
    /// Build a table from columns, validating it is non-empty and rectangular.
    pub fn new(columns: Vec<Series>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(CleaningError::EmptyTable);
        };

        let expected = first.len();
        for series in &columns {
            if series.len() != expected {
                return Err(CleaningError::RaggedColumns {
                    column: series.name().to_string(),
                    expected,
                    actual: series.len(),
                });
            }
        }

        Ok(Self { columns })
    }

    /// Build a table from a polars `DataFrame`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| col.as_materialized_series().clone())
            .collect();
        Self::new(columns)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map(|s| s.len()).unwrap_or(0)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// Column names in order, repeats included.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|s| s.name().to_string()).collect()
    }

    /// Column names made unique (`age`, `age_1`, ...).
    pub fn unique_column_names(&self) -> Vec<String> {
        disambiguate_names(&self.column_names())
    }

    /// Names that occur more than once.
    pub fn duplicate_column_names(&self) -> HashSet<String> {
        let mut seen = HashSet::new();
        self.column_names()
            .into_iter()
            .filter(|name| !seen.insert(name.clone()))
            .collect()
    }

    /// Convert into a `DataFrame` using the given (unique) column names.
    pub fn to_dataframe_with_names(&self, names: &[String]) -> Result<DataFrame> {
        if names.len() != self.columns.len() {
            return Err(CleaningError::InvalidInput(format!(
                "expected {} column names, got {}",
                self.columns.len(),
                names.len()
            )));
        }

        let columns: Vec<Column> = self
            .columns
            .iter()
            .zip(names)
            .map(|(series, name)| Column::from(series.clone().with_name(name.as_str().into())))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Convert into a `DataFrame` with disambiguated column names.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        self.to_dataframe_with_names(&self.unique_column_names())
    }

    /// First `n` rows as JSON records keyed by the disambiguated names.
    pub fn head_records(&self, n: usize) -> Result<Vec<Map<String, Value>>> {
        let df = self.to_dataframe()?;
        dataframe_records(&df, Some(n))
    }
}

impl TryFrom<DataFrame> for Table {
    type Error = CleaningError;

    fn try_from(df: DataFrame) -> Result<Self> {
        Table::from_dataframe(&df)
    }
}

/// Rows of a `DataFrame` as JSON records, optionally limited to the first `limit`.
pub fn dataframe_records(df: &DataFrame, limit: Option<usize>) -> Result<Vec<Map<String, Value>>> {
    let height = limit.map_or(df.height(), |n| n.min(df.height()));
    let mut records = Vec::with_capacity(height);

    for row in 0..height {
        let mut record = Map::new();
        for col in df.get_columns() {
            let value = col.as_materialized_series().get(row)?;
            record.insert(col.name().to_string(), any_value_to_json(value));
        }
        records.push(record);
    }

    Ok(records)
}

/// Convert a polars value into JSON; NaN/Infinity become `null`.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        _ => Value::String(format!("{}", value)),
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Per-column diagnostic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Disambiguated column name.
    pub name: String,
    pub kind: ColumnKind,
    /// Polars dtype name.
    pub dtype: String,
    pub missing_count: usize,
    /// 0-100, one decimal.
    pub missing_percentage: f64,
    /// Distinct non-missing values.
    pub unique_count: usize,
    /// Values outside the IQR bounds (numeric columns only).
    pub outlier_count: usize,
    /// Same value spelled with different casing (text columns only).
    pub mixed_capitalization: bool,
    /// Text column whose values are mostly numbers (text columns only).
    pub numeric_like: bool,
    /// The column shares its name with another column.
    pub duplicate_name: bool,
    pub has_problem: bool,
    pub reasons: Vec<String>,
}

/// Dataset-level aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub row_count: usize,
    pub column_count: usize,
    pub total_missing_values: usize,
    pub duplicate_row_count: usize,
    /// 0-100, one decimal.
    pub cleanliness_percentage: f64,
}

/// Profiler output: overview plus ordered column profiles.
#[derive(Debug, Clone, Serialize)]
pub struct TableProfile {
    pub overview: OverviewStats,
    #[serde(rename = "column_details", serialize_with = "serialize_profiles")]
    pub columns: Vec<ColumnProfile>,
}

impl TableProfile {
    /// Look up a profile by its disambiguated name.
    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|p| p.name == name)
    }

    /// Profiles flagged with at least one problem.
    pub fn problem_columns(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|p| p.has_problem)
    }
}

/// Serialize profiles as a name-keyed map that keeps column order.
fn serialize_profiles<S>(profiles: &[ColumnProfile], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(profiles.len()))?;
    for profile in profiles {
        map.serialize_entry(&profile.name, profile)?;
    }
    map.end()
}

// ============================================================================
// Action Log
// ============================================================================

/// Types of actions the executor can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A duplicate column name was suffixed.
    ColumnRenamed,
    /// A column was removed from the dataset.
    ColumnRemoved,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Missing values were filled.
    ValueImputed,
    /// Column names were normalized.
    NamesNormalized,
    /// Text values were trimmed or re-cased.
    ValueCleaned,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnRenamed => "Column Renamed",
            Self::ColumnRemoved => "Column Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ValueImputed => "Value Imputed",
            Self::NamesNormalized => "Names Normalized",
            Self::ValueCleaned => "Value Cleaned",
        }
    }
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name or "dataset".
    pub target: String,
    pub description: String,
}

impl CleaningAction {
    pub fn new(action_type: ActionType, target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Executor output.
///
/// The cleaned frame is produced fresh; the input table is never modified.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    pub cleaned: DataFrame,
    pub actions: Vec<CleaningAction>,
    pub columns_dropped: Vec<String>,
    pub columns_filled: Vec<String>,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl CleaningResult {
    /// Action descriptions in the order they were applied.
    pub fn action_descriptions(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.description.clone()).collect()
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

static_assertions::assert_impl_all!(Table: Send, Sync);
static_assertions::assert_impl_all!(TableProfile: Send, Sync);
static_assertions::assert_impl_all!(CleaningResult: Send, Sync);

// ============================================================================
// Tests
// ============================================================================
