//! CLI entry point for the data cleaner.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use data_cleaner::{
    AnalysisReport, CleanOutcome, CleaningConfig, CleaningPipeline, CleaningPreview, FillStrategy,
    TableFormat, io,
};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI-compatible fill strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFillStrategy {
    /// Fill with the statistic suited to the column type
    Auto,
    /// Only drop columns above the threshold, never fill
    Drop,
    /// Fill every column below the threshold
    Fill,
}

impl From<CliFillStrategy> for FillStrategy {
    fn from(cli: CliFillStrategy) -> Self {
        match cli {
            CliFillStrategy::Auto => FillStrategy::Auto,
            CliFillStrategy::Drop => FillStrategy::Drop,
            CliFillStrategy::Fill => FillStrategy::Fill,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Data-quality profiling and automatic cleaning",
    long_about = "Profiles CSV/JSON datasets for data-quality defects and cleans them.\n\n\
                  EXAMPLES:\n  \
                  # Quality report with recommendations\n  \
                  data-cleaner analyze data.csv\n\n  \
                  # Preview what cleaning would do\n  \
                  data-cleaner preview data.csv --missing-threshold 0.5\n\n  \
                  # Clean and write cleaned_data.csv\n  \
                  data-cleaner clean data.csv --fill-strategy auto"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the JSON payload is written.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a dataset and print recommendations
    Analyze {
        /// Path to a .csv or .json file
        file: PathBuf,
    },

    /// Show what cleaning would do without writing anything
    Preview {
        /// Path to a .csv or .json file
        file: PathBuf,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Clean a dataset and write the result
    Clean {
        /// Path to a .csv or .json file
        file: PathBuf,

        /// Output path (default: cleaned_<file> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },
}

#[derive(clap::Args, Debug)]
struct CleaningArgs {
    /// Missing value threshold (0.0 - 1.0)
    ///
    /// Columns with a missing fraction above this value are dropped
    #[arg(long, default_value = "0.8")]
    missing_threshold: f64,

    /// Strategy for handling missing values
    #[arg(long, value_enum, default_value = "auto")]
    fill_strategy: CliFillStrategy,
}

impl CleaningArgs {
    fn to_config(&self) -> Result<CleaningConfig> {
        Ok(CleaningConfig::builder()
            .missing_threshold(self.missing_threshold)
            .fill_strategy(self.fill_strategy.into())
            .build()?)
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables (RUST_LOG) from .env file
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    match &args.command {
        Command::Analyze { file } => run_analyze(file, args.json),
        Command::Preview { file, cleaning } => run_preview(file, cleaning, args.json),
        Command::Clean {
            file,
            output,
            cleaning,
        } => run_clean(file, output.as_deref(), cleaning, args.json),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    Ok(())
}

fn run_analyze(file: &Path, json: bool) -> Result<()> {
    ensure_exists(file)?;
    let table = io::load_table(file)?;
    info!("Dataset loaded: {} rows x {} columns", table.height(), table.width());

    let report = CleaningPipeline::default().analyze(&table)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_analysis(file, &report);
    }
    Ok(())
}

fn run_preview(file: &Path, cleaning: &CleaningArgs, json: bool) -> Result<()> {
    ensure_exists(file)?;
    let format = TableFormat::from_path(file)?;
    let table = io::load_table(file)?;

    let pipeline = CleaningPipeline::builder()
        .config(cleaning.to_config()?)
        .source(file_name(file), format.extension())
        .build()?;
    let preview = pipeline.preview(&table)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_preview(&preview);
    }
    Ok(())
}

fn run_clean(file: &Path, output: Option<&Path>, cleaning: &CleaningArgs, json: bool) -> Result<()> {
    ensure_exists(file)?;
    let table = io::load_table(file)?;

    let pipeline = CleaningPipeline::builder()
        .config(cleaning.to_config()?)
        .build()?;
    let outcome = pipeline.clean(&table)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(file));
    let output_format = TableFormat::from_path(&output_path)?;
    let bytes = io::write_table(&outcome.cleaned, output_format)?;
    std::fs::write(&output_path, bytes)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!("Cleaned dataset written to {}", output_path.display());

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.metadata)?);
    } else {
        print_clean_summary(&output_path, &outcome);
    }
    Ok(())
}

/// `cleaned_<name>` in the input's directory.
fn default_output_path(input: &Path) -> PathBuf {
    let name = format!("cleaned_{}", file_name(input));
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string()
}

// ============================================================================
// Human-readable output
//
// These functions use `println!` intentionally: they are the command's output,
// not logs, and must be visible regardless of log level.
// ============================================================================

fn print_analysis(file: &Path, report: &AnalysisReport) {
    let overview = &report.profile.overview;

    println!("\n{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", file.display());
    println!("  Rows: {}", overview.row_count);
    println!("  Columns: {}", overview.column_count);
    println!("  Missing values: {}", overview.total_missing_values);
    println!("  Duplicate rows: {}", overview.duplicate_row_count);
    println!("  Cleanliness: {:.1}%", overview.cleanliness_percentage);
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<10} {:<10} {:<8} {:<9} {}",
        "Column", "Kind", "Missing %", "Unique", "Outliers", "Problems"
    );
    println!("{}", "-".repeat(80));
    for col in &report.profile.columns {
        println!(
            "{:<20} {:<10} {:<10.1} {:<8} {:<9} {}",
            truncate_str(&col.name, 19),
            col.kind.as_str(),
            col.missing_percentage,
            col.unique_count,
            col.outlier_count,
            col.reasons.join("; ")
        );
    }
    println!();

    println!("RECOMMENDATIONS");
    println!("{}", "-".repeat(40));
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }
    println!();
}

fn print_preview(preview: &CleaningPreview) {
    println!("\n{}", "=".repeat(80));
    println!("CLEANING PREVIEW");
    println!("{}\n", "=".repeat(80));

    println!("  Rows: {}", preview.file_info.total_rows);
    println!("  Columns: {}", preview.file_info.total_columns);
    println!(
        "  Strategy: {} (missing threshold {:.0}%)",
        preview.cleaning_strategy.fill_strategy,
        preview.cleaning_strategy.missing_threshold * 100.0
    );
    println!();

    if !preview.missing_value_analysis.is_empty() {
        println!("MISSING VALUES");
        println!("{}", "-".repeat(40));
        println!("{:<20} {:<10} {:<10} {}", "Column", "Missing", "Missing %", "Treatment");
        println!("{}", "-".repeat(70));
        for col in &preview.missing_value_analysis {
            println!(
                "{:<20} {:<10} {:<10.1} {}",
                truncate_str(&col.column_name, 19),
                col.missing_count,
                col.missing_percentage,
                col.fill_strategy
            );
        }
        println!();
    }

    println!("PREDICTED ACTIONS");
    println!("{}", "-".repeat(40));
    if preview.predicted_actions.is_empty() {
        println!("  (none)");
    }
    for action in &preview.predicted_actions {
        println!("  - {}", action);
    }
    println!();

    println!("SUMMARY");
    println!("{}", "-".repeat(40));
    println!("  Columns with missing values: {}", preview.summary.total_missing_columns);
    println!("  Columns over 80% missing: {}", preview.summary.high_missing_columns);
    println!("  Columns after cleaning: {}", preview.summary.columns_after_cleaning);
    println!("  Estimated improvement: {}", preview.summary.estimated_improvement);
    println!();
}

fn print_clean_summary(output: &Path, outcome: &CleanOutcome) {
    let metadata = &outcome.metadata;

    println!("\n{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}\n", "=".repeat(80));

    println!("  Output: {}", output.display());
    println!(
        "  Columns: {} -> {}",
        metadata.original_columns, metadata.final_columns
    );
    println!("  Rows removed: {}", metadata.rows_removed);
    if !metadata.columns_dropped.is_empty() {
        println!("  Dropped: {}", metadata.columns_dropped.join(", "));
    }
    if !metadata.columns_filled.is_empty() {
        println!("  Filled: {}", metadata.columns_filled.join(", "));
    }
    println!();

    println!("ACTIONS");
    println!("{}", "-".repeat(40));
    if metadata.actions.is_empty() {
        println!("  (no changes needed)");
    }
    for action in &metadata.actions {
        println!("  - {}", action);
    }
    println!();
}

/// Truncate a string to max length with ellipsis.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
