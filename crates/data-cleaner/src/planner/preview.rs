//! Dry-run view of a cleaning plan.

use super::{ColumnAction, PlannerOutput, fill_label, is_high_missing};
use crate::config::{CleaningConfig, SEVERE_MISSING_PCT};
use crate::types::TableProfile;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Where the previewed table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub filename: String,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// Missing-value diagnosis and planned treatment of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMissingAnalysis {
    pub column_name: String,
    pub data_type: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
    pub unique_values: usize,
    pub will_be_dropped: bool,
    pub fill_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSummary {
    pub total_missing_columns: usize,
    /// Columns with more than 80% missing.
    pub high_missing_columns: usize,
    pub columns_after_cleaning: usize,
    pub estimated_improvement: String,
}

/// What a clean call would do, without executing it.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningPreview {
    pub file_info: FileInfo,
    pub cleaning_strategy: CleaningConfig,
    #[serde(serialize_with = "serialize_analysis")]
    pub missing_value_analysis: Vec<ColumnMissingAnalysis>,
    pub predicted_actions: Vec<String>,
    pub columns_to_drop: Vec<String>,
    pub columns_to_fill: Vec<String>,
    pub summary: PreviewSummary,
}

impl CleaningPreview {
    /// Assemble the preview from the profile and planner output of one table.
    pub fn build(
        profile: &TableProfile,
        output: &PlannerOutput,
        config: &CleaningConfig,
        source: Option<SourceInfo>,
    ) -> Self {
        let (filename, file_type) = match source {
            Some(source) => (Some(source.filename), Some(source.file_type)),
            None => (None, None),
        };

        let missing_value_analysis: Vec<ColumnMissingAnalysis> = profile
            .columns
            .iter()
            .filter(|c| c.missing_count > 0)
            .map(|c| {
                let planned = output.plan.column(&c.name);
                let action = planned.map(|p| &p.action);
                let fill_strategy = match planned {
                    Some(p) if p.action == ColumnAction::Drop => "column will be dropped".to_string(),
                    Some(p) => match p.action.fill_method() {
                        Some(method) => fill_label(&method, is_high_missing(p.missing_percentage)),
                        None => "no action needed".to_string(),
                    },
                    None => "no action needed".to_string(),
                };
                ColumnMissingAnalysis {
                    column_name: c.name.clone(),
                    data_type: c.dtype.clone(),
                    missing_count: c.missing_count,
                    missing_percentage: c.missing_percentage,
                    unique_values: c.unique_count,
                    will_be_dropped: action == Some(&ColumnAction::Drop),
                    fill_strategy,
                }
            })
            .collect();

        let columns_to_drop = output.plan.columns_to_drop();
        let columns_to_fill = output.plan.columns_to_fill();
        let total_columns = profile.overview.column_count;

        let improvement = if total_columns == 0 {
            0.0
        } else {
            columns_to_drop.len() as f64 / total_columns as f64 * 100.0
        };

        let summary = PreviewSummary {
            total_missing_columns: missing_value_analysis.len(),
            high_missing_columns: profile
                .columns
                .iter()
                .filter(|c| c.missing_percentage > SEVERE_MISSING_PCT)
                .count(),
            columns_after_cleaning: total_columns - columns_to_drop.len(),
            estimated_improvement: format!("{:.1}% reduction in problematic columns", improvement),
        };

        Self {
            file_info: FileInfo {
                filename,
                file_type,
                total_rows: profile.overview.row_count,
                total_columns,
            },
            cleaning_strategy: *config,
            missing_value_analysis,
            predicted_actions: output.predicted_actions.clone(),
            columns_to_drop,
            columns_to_fill,
            summary,
        }
    }
}

fn serialize_analysis<S>(
    entries: &[ColumnMissingAnalysis],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for entry in entries {
        map.serialize_entry(&entry.column_name, entry)?;
    }
    map.end()
}
