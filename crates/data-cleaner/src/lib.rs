//! Data Cleaner Library
//!
//! A data-quality profiling and automatic cleaning engine built with Rust and Polars.
//!
//! # Overview
//!
//! The engine consists of four stages, run in this order:
//!
//! - **Profiler**: per-column missing values, distinct values, IQR outliers and
//!   formatting defects, plus duplicate rows and a cleanliness score
//! - **Planner**: decides per column whether to drop it or fill its missing
//!   values, and predicts the resulting shape (the preview)
//! - **Executor**: applies the plan and produces the cleaned frame plus an
//!   action log
//! - **ReportBuilder**: turns the results into ordered recommendations and
//!   response payloads
//!
//! The [`io`] module loads CSV/JSON files into a [`Table`] and writes cleaned
//! frames back; the engine itself never touches files.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_cleaner::{CleaningConfig, CleaningPipeline, FillStrategy, io};
//!
//! let table = io::load_table("data.csv")?;
//!
//! // Analyze only
//! let report = CleaningPipeline::default().analyze(&table)?;
//! println!("{:?}", report.recommendations);
//!
//! // Preview, then clean
//! let config = CleaningConfig::builder()
//!     .missing_threshold(0.5)
//!     .fill_strategy(FillStrategy::Auto)
//!     .build()?;
//! let pipeline = CleaningPipeline::builder().config(config).build()?;
//!
//! let preview = pipeline.preview(&table)?;
//! println!("{:?}", preview.predicted_actions);
//!
//! let outcome = pipeline.clean(&table)?;
//! let bytes = io::write_table(&outcome.cleaned, io::TableFormat::Csv)?;
//! ```
//!
//! # Configuration
//!
//! [`CleaningConfig`] is passed explicitly to every planning call:
//!
//! - `missing_threshold`: columns with a missing fraction strictly above it are dropped (default 0.8)
//! - `fill_strategy`: `auto`, `drop` (never fill) or `fill` (default `auto`)

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod planner;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError, FillStrategy};
pub use error::{CleaningError, Result as CleanerResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use io::{TableFormat, load_table, read_table, write_table};
pub use pipeline::{CleaningExecutor, CleaningPipeline, CleaningPipelineBuilder};
pub use planner::{
    CleaningPlan, CleaningPlanner, CleaningPreview, ColumnAction, ColumnRename, FillMethod,
    FillValue, PlannedColumn, PlannerOutput,
};
pub use profiler::DataProfiler;
pub use reporting::{
    AnalysisReport, CleanOutcome, CleaningMetadata, CleaningSummary, QualityReport, ReportBuilder,
};
pub use types::{
    ActionType, CleaningAction, CleaningResult, ColumnProfile, OverviewStats, Table, TableProfile,
};
pub use utils::ColumnKind;
