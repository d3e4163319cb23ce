//! Rio de Janeiro Airbnb listings ETL.
//!
//! A batch pipeline built on Polars that joins the listings and reviews
//! tables, cleans a fixed set of columns and writes modeling-ready artifacts.
//!
//! # Overview
//!
//! The run has two stages:
//!
//! - **Cleaning**: inner join on `id`, numeric coercion, median imputation,
//!   `"Unknown"` fill of categorical columns, single-pass IQR filtering of
//!   `price`, categorical codes (`<col>_code`) and z-scores (`<col>_z`)
//! - **Packaging**: projection of the cleaned table onto an ordered
//!   allow-list of model columns, plus the delivery summary text
//!
//! [`Pipeline::run`] wraps both stages with file I/O: it reads
//! `listings_cleaned.csv` and `reviews.csv` and writes the cleaned and model
//! CSVs, two price box plots, `README_ENTREGA.txt` and `pipeline_report.json`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use airbnb_rio_etl::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_dir("data")
//!     .output_dir("airbnb_rio_outputs")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{} model rows", result.summary.model_rows);
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod ingest;
pub mod pipeline;
pub mod plotting;
pub mod reporting;
pub mod statistics;
pub mod transformers;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::TypeCoercer;
pub use config::{ConfigValidationError, OutputFiles, PipelineConfig, PipelineConfigBuilder};
pub use error::{EtlError, Result as EtlResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use ingest::{join_on_key, load_csv};
pub use pipeline::{
    ClosureProgressReporter, IqrBounds, OutlierHandler, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use plotting::{BoxplotRenderer, BoxplotStats};
pub use reporting::{ModelProjection, ReportGenerator};
pub use transformers::{CategoricalEncoder, ZScoreNormalizer};
pub use types::{
    ActionType, CategoryMapping, CleaningOutput, ImputationRecord, OutlierSummary, PackageOutput,
    PipelineAction, PipelineResult, PipelineSummary, ProjectionSummary, ZScoreRecord,
};
pub use utils::{format_thousands, parse_numeric_string};
