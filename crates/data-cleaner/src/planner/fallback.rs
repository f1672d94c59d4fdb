//! Fill methods and their per-kind fallback chains.

use crate::config::{HIGH_MISSING_FILL_PCT, UNKNOWN_FILL};
use crate::utils::ColumnKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete value written into missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Number(n) => write!(f, "{}", n),
            FillValue::Text(s) => f.write_str(s),
        }
    }
}

/// One step of a fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    Mean,
    Median,
    Mode,
    Constant(FillValue),
}

impl FillMethod {
    /// Short label used in previews and action descriptions.
    pub fn label(&self) -> String {
        match self {
            FillMethod::Mean => "mean".to_string(),
            FillMethod::Median => "median".to_string(),
            FillMethod::Mode => "mode".to_string(),
            FillMethod::Constant(value) => value.to_string(),
        }
    }
}

/// Whether a missing percentage calls for the robust end of the chain.
#[inline]
pub fn is_high_missing(missing_percentage: f64) -> bool {
    missing_percentage > HIGH_MISSING_FILL_PCT
}

/// Ordered fill methods to try for a column.
///
/// | kind          | normal                          | high missing          |
/// |---------------|---------------------------------|-----------------------|
/// | Numeric       | Mean, Median, Constant(0)       | Median, Constant(0)   |
/// | Text, Unknown | Mode, Constant("Unknown")       | Constant("Unknown")   |
pub fn fallback_chain(kind: ColumnKind, high_missing: bool) -> Vec<FillMethod> {
    let zero = FillMethod::Constant(FillValue::Number(0.0));
    let unknown = FillMethod::Constant(FillValue::Text(UNKNOWN_FILL.to_string()));

    match (kind, high_missing) {
        (ColumnKind::Numeric, false) => vec![FillMethod::Mean, FillMethod::Median, zero],
        (ColumnKind::Numeric, true) => vec![FillMethod::Median, zero],
        (ColumnKind::Text | ColumnKind::Unknown, false) => vec![FillMethod::Mode, unknown],
        (ColumnKind::Text | ColumnKind::Unknown, true) => vec![unknown],
    }
}
