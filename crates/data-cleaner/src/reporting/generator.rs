use crate::config::{CleaningConfig, FillStrategy, HIGH_MISSING_REASON_PCT};
use crate::types::{
    CleaningAction, CleaningResult, ColumnProfile, OverviewStats, TableProfile, dataframe_records,
};
use chrono::Local;
use polars::prelude::*;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Recommendation emitted when nothing needs attention.
pub const CLEAN_DATA_MESSAGE: &str = "Good news: no major data quality issues found!";

/// Prefix that marks a header cell the source file left empty.
pub const UNNAMED_COLUMN_PREFIX: &str = "unnamed:";

// ============================================================================
// Report Types
// ============================================================================

/// Recommendations plus, after a clean, a summary of what changed.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub overview: OverviewStats,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning_summary: Option<CleaningSummary>,
}

/// Shape change and applied actions of one cleaning run.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub columns_dropped: Vec<String>,
    pub columns_filled: Vec<String>,
    pub actions: Vec<CleaningAction>,
}

/// Output of the analyze path.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    /// Overview and `column_details`.
    #[serde(flatten)]
    pub profile: TableProfile,
    pub recommendations: Vec<String>,
    /// First rows of the original table.
    pub preview: Vec<Map<String, Value>>,
    pub columns: Vec<String>,
}

/// Metadata of a clean call, kept apart from the cleaned data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningMetadata {
    pub strategy: FillStrategy,
    pub missing_threshold: f64,
    pub original_columns: usize,
    pub final_columns: usize,
    pub columns_dropped: Vec<String>,
    pub columns_filled: Vec<String>,
    pub rows_removed: usize,
    pub actions: Vec<String>,
}

impl CleaningMetadata {
    pub fn new(config: &CleaningConfig, original_columns: usize, result: &CleaningResult) -> Self {
        Self {
            strategy: config.fill_strategy,
            missing_threshold: config.missing_threshold,
            original_columns,
            final_columns: result.cleaned.width(),
            columns_dropped: result.columns_dropped.clone(),
            columns_filled: result.columns_filled.clone(),
            rows_removed: result.rows_removed(),
            actions: result.action_descriptions(),
        }
    }
}

/// Output of the clean path.
#[derive(Debug, Clone, Serialize)]
pub struct CleanOutcome {
    #[serde(serialize_with = "serialize_frame")]
    pub cleaned: DataFrame,
    pub metadata: CleaningMetadata,
    pub report: QualityReport,
}

fn serialize_frame<S>(df: &DataFrame, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let records = dataframe_records(df, None).map_err(serde::ser::Error::custom)?;
    records.serialize(serializer)
}

// ============================================================================
// Report Builder
// ============================================================================

/// Builds recommendation strings and report payloads.
pub struct ReportBuilder;

impl ReportBuilder {
    /// Build a quality report.
    ///
    /// Recommendations are ordered duplicates, missing values, outliers,
    /// formatting. When `cleaning` is given, its summary is attached.
    pub fn build(
        overview: &OverviewStats,
        columns: &[ColumnProfile],
        cleaning: Option<&CleaningResult>,
    ) -> QualityReport {
        let recommendations = Self::recommendations(overview, columns);
        debug!("Built {} recommendations", recommendations.len());

        let cleaning_summary = cleaning.map(|result| CleaningSummary {
            rows_before: result.rows_before,
            rows_after: result.rows_after,
            columns_before: overview.column_count,
            columns_after: result.cleaned.width(),
            columns_dropped: result.columns_dropped.clone(),
            columns_filled: result.columns_filled.clone(),
            actions: result.actions.clone(),
        });

        QualityReport {
            generated_at: timestamp(),
            overview: *overview,
            recommendations,
            cleaning_summary,
        }
    }

    /// Build the analyze payload.
    pub fn analysis(profile: TableProfile, preview: Vec<Map<String, Value>>) -> AnalysisReport {
        let recommendations = Self::recommendations(&profile.overview, &profile.columns);
        let columns = profile.columns.iter().map(|c| c.name.clone()).collect();

        AnalysisReport {
            generated_at: timestamp(),
            profile,
            recommendations,
            preview,
            columns,
        }
    }

    /// Recommendation strings in severity order.
    pub fn recommendations(overview: &OverviewStats, columns: &[ColumnProfile]) -> Vec<String> {
        let mut recommendations = Vec::new();

        // Duplicates
        if overview.duplicate_row_count > 0 {
            recommendations.push(format!(
                "Found {} duplicate rows. Consider removing them.",
                overview.duplicate_row_count
            ));
        }

        // Missing values
        if overview.total_missing_values > 0 {
            recommendations.push(
                "The dataset contains missing values. Consider a strategy to fill or remove them."
                    .to_string(),
            );
        }
        for col in columns.iter().filter(|c| c.missing_percentage > HIGH_MISSING_REASON_PCT) {
            recommendations.push(format!(
                "Column '{}' is {:.1}% empty. Consider filling or dropping it.",
                col.name, col.missing_percentage
            ));
        }

        // Outliers
        for col in columns.iter().filter(|c| c.outlier_count > 0) {
            recommendations.push(format!(
                "Column '{}' has {} potential outliers.",
                col.name, col.outlier_count
            ));
        }

        // Formatting
        if columns
            .iter()
            .any(|c| c.name.to_lowercase().starts_with(UNNAMED_COLUMN_PREFIX))
        {
            recommendations.push("The file seems to be missing proper headers.".to_string());
        }
        for col in columns {
            if col.mixed_capitalization {
                recommendations.push(format!(
                    "Column '{}' has inconsistent capitalization. Standardize it.",
                    col.name
                ));
            }
            if col.numeric_like {
                recommendations.push(format!(
                    "Column '{}' seems numeric but is stored as text. Convert its data type.",
                    col.name
                ));
            }
            if col.duplicate_name {
                recommendations.push(format!(
                    "Column '{}' shares its name with another column. Rename it.",
                    col.name
                ));
            }
        }

        if recommendations.is_empty() {
            recommendations.push(CLEAN_DATA_MESSAGE.to_string());
        }

        recommendations
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ColumnKind;
    use pretty_assertions::assert_eq;

    fn overview(duplicates: usize, missing: usize) -> OverviewStats {
        OverviewStats {
            row_count: 10,
            column_count: 2,
            total_missing_values: missing,
            duplicate_row_count: duplicates,
            cleanliness_percentage: 90.0,
        }
    }

    fn column(name: &str) -> ColumnProfile {
        ColumnProfile {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
            dtype: "i64".to_string(),
            missing_count: 0,
            missing_percentage: 0.0,
            unique_count: 10,
            outlier_count: 0,
            mixed_capitalization: false,
            numeric_like: false,
            duplicate_name: false,
            has_problem: false,
            reasons: vec![],
        }
    }

    #[test]
    fn test_clean_data_message() {
        let report = ReportBuilder::build(&overview(0, 0), &[column("a")], None);
        assert_eq!(report.recommendations, vec![CLEAN_DATA_MESSAGE]);
        assert!(report.cleaning_summary.is_none());
    }

    #[test]
    fn test_recommendation_order() {
        let mut city = column("city");
        city.kind = ColumnKind::Text;
        city.mixed_capitalization = true;
        city.missing_count = 3;
        city.missing_percentage = 30.0;

        let mut income = column("income");
        income.outlier_count = 1;

        let recommendations =
            ReportBuilder::recommendations(&overview(2, 3), &[city, income]);

        assert_eq!(
            recommendations,
            vec![
                "Found 2 duplicate rows. Consider removing them.",
                "The dataset contains missing values. Consider a strategy to fill or remove them.",
                "Column 'city' is 30.0% empty. Consider filling or dropping it.",
                "Column 'income' has 1 potential outliers.",
                "Column 'city' has inconsistent capitalization. Standardize it.",
            ]
        );
    }

    #[test]
    fn test_missing_headers_and_duplicate_names() {
        let mut age = column("age");
        age.duplicate_name = true;
        let mut age_1 = column("age_1");
        age_1.duplicate_name = true;

        let recommendations = ReportBuilder::recommendations(
            &overview(0, 0),
            &[column("Unnamed: 0"), age, age_1],
        );
        assert_eq!(recommendations[0], "The file seems to be missing proper headers.");
        assert_eq!(recommendations.len(), 3);
    }

    #[test]
    fn test_report_serializes_timestamp_in_envelope() {
        let report = ReportBuilder::build(&overview(0, 0), &[column("a")], None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["generated_at"].is_string());
        assert!(json.get("cleaning_summary").is_none());
    }
}
