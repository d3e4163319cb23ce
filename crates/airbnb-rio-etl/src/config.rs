//! Configuration types for the listings ETL pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults describe the one dataset shape this pipeline is written for;
//! overriding them is mostly useful for tests and for pointing the run at
//! another directory.

use crate::error::EtlError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Numeric columns coerced, imputed and normalized by the pipeline.
pub const DEFAULT_NUMERIC_COLUMNS: [&str; 7] = [
    "accommodates",
    "bathrooms",
    "bedrooms",
    "beds",
    "price",
    "number_of_reviews",
    "review_scores_rating",
];

/// Categorical columns, in the order their `_code` columns are appended.
pub const DEFAULT_CATEGORICAL_COLUMNS: [&str; 2] = ["room_type", "neighbourhood_cleansed"];

/// Columns kept in the model table, in output order.
pub const DEFAULT_MODEL_COLUMNS: [&str; 12] = [
    "id",
    "neighbourhood_cleansed",
    "room_type",
    "accommodates",
    "bathrooms",
    "bedrooms",
    "beds",
    "price",
    "number_of_reviews",
    "review_scores_rating",
    "neighbourhood_cleansed_code",
    "room_type_code",
];

/// Output file names produced by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFiles {
    pub cleaned_csv: String,
    pub model_csv: String,
    pub boxplot_before: String,
    pub boxplot_after: String,
    pub summary_txt: String,
    pub report_json: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            cleaned_csv: "airbnb_rio_cleaned.csv".to_string(),
            model_csv: "airbnb_rio_model.csv".to_string(),
            boxplot_before: "boxplot_price_before.png".to_string(),
            boxplot_after: "boxplot_price_after.png".to_string(),
            summary_txt: "README_ENTREGA.txt".to_string(),
            report_json: "pipeline_report.json".to_string(),
        }
    }
}

/// Configuration for the ETL pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use airbnb_rio_etl::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_dir("data")
///     .output_dir("out")
///     .write_plots(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the two input CSV files.
    /// Default: "."
    pub input_dir: PathBuf,

    /// Listings file name inside `input_dir`.
    /// Default: "listings_cleaned.csv"
    pub listings_file: String,

    /// Reviews file name inside `input_dir`.
    /// Default: "reviews.csv"
    pub reviews_file: String,

    /// Directory receiving every artifact. Created if absent.
    /// Default: "airbnb_rio_outputs"
    pub output_dir: PathBuf,

    /// Output file names.
    pub output_files: OutputFiles,

    /// Column both inputs are joined on.
    /// Default: "id"
    pub join_key: String,

    /// Suffix appended to review columns whose name collides with a listing column.
    /// Default: "_review"
    pub join_suffix: String,

    /// Columns coerced to numbers, median-imputed and z-scored.
    pub numeric_columns: Vec<String>,

    /// Columns filled with `categorical_fill` and given integer codes.
    pub categorical_columns: Vec<String>,

    /// Placeholder for missing categorical values.
    /// Default: "Unknown"
    pub categorical_fill: String,

    /// Column whose IQR bounds decide which rows are outliers.
    /// Default: "price"
    pub outlier_column: String,

    /// IQR multiplier for the outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Ordered allow-list projected into the model table.
    pub model_columns: Vec<String>,

    /// Whether to render the before/after box plots.
    /// Default: true
    pub write_plots: bool,

    /// Whether to write the JSON run report.
    /// Default: true
    pub write_report: bool,

    /// Box plot width in pixels.
    /// Default: 640
    pub plot_width: u32,

    /// Box plot height in pixels.
    /// Default: 480
    pub plot_height: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            listings_file: "listings_cleaned.csv".to_string(),
            reviews_file: "reviews.csv".to_string(),
            output_dir: PathBuf::from("airbnb_rio_outputs"),
            output_files: OutputFiles::default(),
            join_key: "id".to_string(),
            join_suffix: "_review".to_string(),
            numeric_columns: to_strings(&DEFAULT_NUMERIC_COLUMNS),
            categorical_columns: to_strings(&DEFAULT_CATEGORICAL_COLUMNS),
            categorical_fill: "Unknown".to_string(),
            outlier_column: "price".to_string(),
            iqr_multiplier: 1.5,
            model_columns: to_strings(&DEFAULT_MODEL_COLUMNS),
            write_plots: true,
            write_report: true,
            plot_width: 640,
            plot_height: 480,
        }
    }
}

fn to_strings(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Full path of the listings input.
    pub fn listings_path(&self) -> PathBuf {
        self.input_dir.join(&self.listings_file)
    }

    /// Full path of the reviews input.
    pub fn reviews_path(&self) -> PathBuf {
        self.input_dir.join(&self.reviews_file)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.join_key.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("join_key".to_string()));
        }

        if self.join_suffix.is_empty() {
            return Err(ConfigValidationError::EmptyField("join_suffix".to_string()));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if !self.numeric_columns.contains(&self.outlier_column) {
            return Err(ConfigValidationError::OutlierColumnNotNumeric(
                self.outlier_column.clone(),
            ));
        }

        if self.plot_width < 64 || self.plot_height < 64 {
            return Err(ConfigValidationError::PlotTooSmall {
                width: self.plot_width,
                height: self.plot_height,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Configuration field '{0}' must not be empty")]
    EmptyField(String),

    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidIqrMultiplier(f64),

    #[error("Outlier column '{0}' must be one of the numeric columns")]
    OutlierColumnNotNumeric(String),

    #[error("Plot size {width}x{height} is too small (minimum 64x64)")]
    PlotTooSmall { width: u32, height: u32 },
}

impl From<ConfigValidationError> for EtlError {
    fn from(err: ConfigValidationError) -> Self {
        EtlError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_dir: Option<PathBuf>,
    listings_file: Option<String>,
    reviews_file: Option<String>,
    output_dir: Option<PathBuf>,
    output_files: Option<OutputFiles>,
    join_key: Option<String>,
    join_suffix: Option<String>,
    numeric_columns: Option<Vec<String>>,
    categorical_columns: Option<Vec<String>>,
    categorical_fill: Option<String>,
    outlier_column: Option<String>,
    iqr_multiplier: Option<f64>,
    model_columns: Option<Vec<String>>,
    write_plots: Option<bool>,
    write_report: Option<bool>,
    plot_width: Option<u32>,
    plot_height: Option<u32>,
}

impl PipelineConfigBuilder {
    /// Set the directory holding the input CSV files.
    pub fn input_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(path.into());
        self
    }

    /// Set the listings file name.
    pub fn listings_file(mut self, name: impl Into<String>) -> Self {
        self.listings_file = Some(name.into());
        self
    }

    /// Set the reviews file name.
    pub fn reviews_file(mut self, name: impl Into<String>) -> Self {
        self.reviews_file = Some(name.into());
        self
    }

    /// Set the output directory for every artifact.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Override the output file names.
    pub fn output_files(mut self, files: OutputFiles) -> Self {
        self.output_files = Some(files);
        self
    }

    /// Set the join key column.
    pub fn join_key(mut self, key: impl Into<String>) -> Self {
        self.join_key = Some(key.into());
        self
    }

    /// Set the suffix for colliding review columns.
    pub fn join_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.join_suffix = Some(suffix.into());
        self
    }

    /// Set the numeric columns.
    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical columns.
    pub fn categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the placeholder for missing categorical values.
    pub fn categorical_fill(mut self, value: impl Into<String>) -> Self {
        self.categorical_fill = Some(value.into());
        self
    }

    /// Set the column used for outlier removal.
    pub fn outlier_column(mut self, column: impl Into<String>) -> Self {
        self.outlier_column = Some(column.into());
        self
    }

    /// Set the IQR multiplier for the outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the model table allow-list.
    pub fn model_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable box plot rendering.
    pub fn write_plots(mut self, write: bool) -> Self {
        self.write_plots = Some(write);
        self
    }

    /// Enable or disable the JSON run report.
    pub fn write_report(mut self, write: bool) -> Self {
        self.write_report = Some(write);
        self
    }

    /// Set the box plot size in pixels.
    pub fn plot_size(mut self, width: u32, height: u32) -> Self {
        self.plot_width = Some(width);
        self.plot_height = Some(height);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_dir: self.input_dir.unwrap_or(defaults.input_dir),
            listings_file: self.listings_file.unwrap_or(defaults.listings_file),
            reviews_file: self.reviews_file.unwrap_or(defaults.reviews_file),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            output_files: self.output_files.unwrap_or(defaults.output_files),
            join_key: self.join_key.unwrap_or(defaults.join_key),
            join_suffix: self.join_suffix.unwrap_or(defaults.join_suffix),
            numeric_columns: self.numeric_columns.unwrap_or(defaults.numeric_columns),
            categorical_columns: self
                .categorical_columns
                .unwrap_or(defaults.categorical_columns),
            categorical_fill: self.categorical_fill.unwrap_or(defaults.categorical_fill),
            outlier_column: self.outlier_column.unwrap_or(defaults.outlier_column),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            model_columns: self.model_columns.unwrap_or(defaults.model_columns),
            write_plots: self.write_plots.unwrap_or(defaults.write_plots),
            write_report: self.write_report.unwrap_or(defaults.write_report),
            plot_width: self.plot_width.unwrap_or(defaults.plot_width),
            plot_height: self.plot_height.unwrap_or(defaults.plot_height),
        };

        config.validate()?;
        Ok(config)
    }
}
