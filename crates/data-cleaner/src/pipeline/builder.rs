//! Cleaning pipeline facade.
//!
//! Composes profiler, planner, executor and report builder into the three
//! request paths: analyze, preview and clean.

use crate::config::{CleaningConfig, PREVIEW_ROWS};
use crate::error::Result;
use crate::pipeline::CleaningExecutor;
use crate::planner::{CleaningPlanner, CleaningPreview, PlannerOutput, SourceInfo};
use crate::profiler::DataProfiler;
use crate::reporting::{AnalysisReport, CleanOutcome, CleaningMetadata, ReportBuilder};
use crate::types::{Table, TableProfile};
use tracing::info;

/// The cleaning pipeline.
///
/// Use [`CleaningPipeline::builder()`] to create a pipeline with a custom
/// configuration.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::{CleaningConfig, CleaningPipeline, FillStrategy};
///
/// let outcome = CleaningPipeline::builder()
///     .config(CleaningConfig::builder().missing_threshold(0.5).build()?)
///     .build()?
///     .clean(&table)?;
///
/// println!("{:?}", outcome.metadata.actions);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CleaningPipeline {
    config: CleaningConfig,
    source: Option<SourceInfo>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send, Sync);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Profile the table and build the analysis payload.
    pub fn analyze(&self, table: &Table) -> Result<AnalysisReport> {
        info!("Analyzing table ({} x {})...", table.height(), table.width());
        let profile = DataProfiler::profile(table);
        let preview = table.head_records(PREVIEW_ROWS)?;
        Ok(ReportBuilder::analysis(profile, preview))
    }

    /// Plan a clean without executing it.
    pub fn preview(&self, table: &Table) -> Result<CleaningPreview> {
        info!("Previewing cleaning ({} x {})...", table.height(), table.width());
        let (profile, output) = self.plan(table)?;
        Ok(CleaningPreview::build(
            &profile,
            &output,
            &self.config,
            self.source.clone(),
        ))
    }

    /// Plan and execute a clean.
    pub fn clean(&self, table: &Table) -> Result<CleanOutcome> {
        info!("Cleaning table ({} x {})...", table.height(), table.width());
        let (profile, output) = self.plan(table)?;
        let result = CleaningExecutor::execute(table, &output.plan)?;

        let metadata = CleaningMetadata::new(&self.config, table.width(), &result);
        let report = ReportBuilder::build(&profile.overview, &profile.columns, Some(&result));

        Ok(CleanOutcome {
            cleaned: result.cleaned,
            metadata,
            report,
        })
    }

    fn plan(&self, table: &Table) -> Result<(TableProfile, PlannerOutput)> {
        let profile = DataProfiler::profile(table);
        let output = CleaningPlanner::plan(table, &profile, &self.config)?;
        Ok((profile, output))
    }
}

/// Builder for [`CleaningPipeline`].
#[derive(Debug, Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    source: Option<SourceInfo>,
}

impl CleaningPipelineBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Name and format of the input, echoed in previews.
    pub fn source(mut self, filename: impl Into<String>, file_type: impl Into<String>) -> Self {
        self.source = Some(SourceInfo {
            filename: filename.into(),
            file_type: file_type.into(),
        });
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<CleaningPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(CleaningPipeline {
            config,
            source: self.source,
        })
    }
}
