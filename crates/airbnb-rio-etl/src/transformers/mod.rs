//! Feature transformers applied to the cleaned table.
//!
//! - [`CategoricalEncoder`] adds an integer `<col>_code` column per categorical column
//! - [`ZScoreNormalizer`] adds a standardized `<col>_z` column per numeric column
//!
//! Both leave the source columns in place.

mod categorical;
mod zscore;

pub use categorical::CategoricalEncoder;
pub use zscore::ZScoreNormalizer;

/// Name of the code column derived from `column`.
pub fn code_column_name(column: &str) -> String {
    format!("{column}_code")
}

/// Name of the z-score column derived from `column`.
pub fn z_column_name(column: &str) -> String {
    format!("{column}_z")
}
