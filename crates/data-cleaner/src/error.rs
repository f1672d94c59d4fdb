//! Error types for the cleaning engine.
//!
//! Errors fall into three families:
//!
//! - **Input errors** (`EmptyTable`, `RaggedColumns`, `ColumnNotFound`,
//!   `UnsupportedFormat`, `InvalidInput`) abort the whole call.
//! - **Configuration errors** (`InvalidConfig`) are raised before planning.
//! - **Statistic errors** (`StatisticUnavailable`) are produced while computing
//!   a fill value and are always recovered through the column's fallback chain.
//!
//! Errors are serializable as `{code, message}` so a service layer can hand
//! them to a client unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the cleaning engine.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// The table has no columns.
    #[error("Table is empty: at least one column is required")]
    EmptyTable,

    /// Columns of the table have different lengths.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Input format is not CSV or JSON.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Input could not be turned into a table.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// A statistic could not be computed for a column.
    #[error("Cannot compute {statistic} for column '{column}'")]
    StatisticUnavailable { column: String, statistic: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a statistic failure on a column.
    pub fn statistic(column: impl Into<String>, statistic: impl Into<String>) -> Self {
        CleaningError::StatisticUnavailable {
            column: column.into(),
            statistic: statistic.into(),
        }
    }

    /// Stable error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTable => "EMPTY_TABLE",
            Self::RaggedColumns { .. } => "RAGGED_COLUMNS",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::StatisticUnavailable { .. } => "STATISTIC_UNAVAILABLE",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error is caused by the caller's input (table or file).
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::EmptyTable
            | Self::RaggedColumns { .. }
            | Self::ColumnNotFound(_)
            | Self::UnsupportedFormat(_)
            | Self::InvalidInput(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }

    /// Whether this error is a configuration error.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
