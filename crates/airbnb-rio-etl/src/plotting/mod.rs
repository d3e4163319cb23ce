//! Diagnostic plots.
//!
//! Box plots of the outlier column are drawn straight onto an RGB raster and
//! saved as PNG.

mod boxplot;

pub use boxplot::{BoxplotRenderer, BoxplotStats};
