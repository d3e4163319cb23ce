//! Artifact emission.
//!
//! [`ModelProjection`] narrows the cleaned table to the modeling columns and
//! [`ReportGenerator`] writes the CSVs, the delivery summary and the JSON run
//! report to the output directory.

mod generator;
mod projection;

pub use generator::ReportGenerator;
pub use projection::ModelProjection;
