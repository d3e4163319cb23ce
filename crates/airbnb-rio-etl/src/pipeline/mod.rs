//! Pipeline module.
//!
//! This module provides the ETL pipeline and its stage components.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use outliers::{IqrBounds, OutlierHandler};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
