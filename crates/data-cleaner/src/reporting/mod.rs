//! Report generation module.
//!
//! Turns profiler and executor outputs into recommendation strings and the
//! payloads of the three request paths.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_cleaner::reporting::ReportBuilder;
//!
//! let report = ReportBuilder::build(&profile.overview, &profile.columns, Some(&result));
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

mod generator;

pub use generator::{
    AnalysisReport, CLEAN_DATA_MESSAGE, CleanOutcome, CleaningMetadata, CleaningSummary,
    QualityReport, ReportBuilder, UNNAMED_COLUMN_PREFIX,
};
