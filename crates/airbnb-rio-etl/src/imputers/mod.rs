//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with their median; categorical columns are
//! filled during type coercion (see [`crate::cleaner::TypeCoercer`]).

mod statistical;

pub use statistical::StatisticalImputer;
