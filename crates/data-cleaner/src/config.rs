//! Configuration types for the cleaning engine.
//!
//! [`CleaningConfig`] is supplied per call and never read from global state.
//! The thresholds the profiler and planner use internally are documented
//! constants in this module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default fraction of missing values above which a column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.8;

/// Missing percentage above which a column is reported as a problem.
pub const HIGH_MISSING_REASON_PCT: f64 = 20.0;

/// Missing percentage above which the planner prefers the robust fill
/// (median for numbers, the constant for text) over mean/mode.
pub const HIGH_MISSING_FILL_PCT: f64 = 50.0;

/// Missing percentage counted as "severe" in preview summaries.
pub const SEVERE_MISSING_PCT: f64 = 80.0;

/// Share of parseable values above which a text column is numeric-like.
pub const NUMERIC_LIKE_RATIO: f64 = 0.9;

/// IQR multiplier for outlier bounds.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Constant used when a text column has no usable mode.
pub const UNKNOWN_FILL: &str = "Unknown";

/// Number of rows included in analysis previews.
pub const PREVIEW_ROWS: usize = 5;

/// How missing values are handled for columns that are not dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// Fill with the statistic suited to the column kind
    #[default]
    Auto,
    /// Never fill; only drop columns above the threshold
    Drop,
    /// Fill every column below the threshold
    Fill,
}

impl FillStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Drop => "drop",
            Self::Fill => "fill",
        }
    }

    /// Whether this strategy fills missing values at all.
    pub fn fills(&self) -> bool {
        !matches!(self, Self::Drop)
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillStrategy {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "drop" => Ok(Self::Drop),
            "fill" => Ok(Self::Fill),
            other => Err(ConfigValidationError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Configuration for one planning/cleaning call.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::config::{CleaningConfig, FillStrategy};
///
/// let config = CleaningConfig::builder()
///     .missing_threshold(0.5)
///     .fill_strategy(FillStrategy::Fill)
///     .build()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Columns whose missing fraction is strictly above this value are dropped.
    /// Default: 0.8
    #[serde(default = "default_missing_threshold")]
    pub missing_threshold: f64,

    /// Strategy for columns that are kept.
    /// Default: Auto
    #[serde(default)]
    pub fill_strategy: FillStrategy,
}

fn default_missing_threshold() -> f64 {
    DEFAULT_MISSING_THRESHOLD
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            fill_strategy: FillStrategy::default(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_threshold".to_string(),
                value: self.missing_threshold,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Unknown fill strategy '{0}' (expected auto, drop or fill)")]
    UnknownStrategy(String),
}

/// Builder for [`CleaningConfig`].
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    missing_threshold: Option<f64>,
    fill_strategy: Option<FillStrategy>,
}

impl CleaningConfigBuilder {
    /// Set the threshold for dropping columns with missing values.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.8 = 80%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Set the fill strategy.
    pub fn fill_strategy(mut self, strategy: FillStrategy) -> Self {
        self.fill_strategy = Some(strategy);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            missing_threshold: self.missing_threshold.unwrap_or(DEFAULT_MISSING_THRESHOLD),
            fill_strategy: self.fill_strategy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.missing_threshold, 0.8);
        assert_eq!(config.fill_strategy, FillStrategy::Auto);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .missing_threshold(0.5)
            .fill_strategy(FillStrategy::Drop)
            .build()
            .unwrap();

        assert_eq!(config.missing_threshold, 0.5);
        assert_eq!(config.fill_strategy, FillStrategy::Drop);
    }

    #[test]
    fn test_validation_rejects_out_of_range_threshold() {
        for bad in [1.5, -0.1, f64::NAN] {
            let result = CleaningConfig::builder().missing_threshold(bad).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidThreshold { .. }
            ));
        }
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        assert!(CleaningConfig::builder().missing_threshold(0.0).build().is_ok());
        assert!(CleaningConfig::builder().missing_threshold(1.0).build().is_ok());
    }

    #[test]
    fn test_fill_strategy_from_str() {
        assert_eq!("auto".parse::<FillStrategy>().unwrap(), FillStrategy::Auto);
        assert_eq!(" DROP ".parse::<FillStrategy>().unwrap(), FillStrategy::Drop);
        assert_eq!("Fill".parse::<FillStrategy>().unwrap(), FillStrategy::Fill);
        assert!(matches!(
            "median".parse::<FillStrategy>(),
            Err(ConfigValidationError::UnknownStrategy(s)) if s == "median"
        ));
    }

    #[test]
    fn test_config_from_json() {
        let config: CleaningConfig =
            serde_json::from_str(r#"{"missing_threshold": 0.6, "fill_strategy": "fill"}"#)
                .unwrap();
        assert_eq!(config.missing_threshold, 0.6);
        assert_eq!(config.fill_strategy, FillStrategy::Fill);

        let defaults: CleaningConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, CleaningConfig::default());
    }

    #[test]
    fn test_unknown_strategy_in_json_is_rejected() {
        let result =
            serde_json::from_str::<CleaningConfig>(r#"{"fill_strategy": "sometimes"}"#);
        assert!(result.is_err());
    }
}
