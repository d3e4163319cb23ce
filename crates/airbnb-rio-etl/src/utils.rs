//! Shared utilities for the ETL pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{EtlError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Column Utilities
// =============================================================================

/// Owned list of the column names of a DataFrame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Check whether a DataFrame has a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Borrow a column as a Series, mapping absence to [`EtlError::ColumnNotFound`].
pub fn require_series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| EtlError::ColumnNotFound(name.to_string()))
}

/// Read a numeric column as `Vec<Option<f64>>`, treating NaN as missing.
pub fn optional_f64_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Present (non-null, non-NaN) values of a numeric column.
pub fn present_f64_values(series: &Series) -> Result<Vec<f64>> {
    Ok(optional_f64_values(series)?.into_iter().flatten().collect())
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Parse a string as a decimal number.
///
/// Surrounding whitespace is ignored. Anything else that is not a plain
/// float literal (currency symbols, thousands separators, words) yields
/// `None`, as does the literal `NaN`.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

// =============================================================================
// Formatting Utilities
// =============================================================================

/// Format a count with `,` as the thousands separator (`12345` -> `12,345`).
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("  3.5 "), Some(3.5));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("abc"), None);
        assert_eq!(parse_numeric_string("$1,234.56"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(26615), "26,615");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_column_helpers() {
        let df = df![
            "id" => [1i64, 2],
            "price" => [Some(10.0), Some(f64::NAN)],
        ]
        .unwrap();

        assert_eq!(column_names(&df), vec!["id", "price"]);
        assert!(has_column(&df, "price"));
        assert!(!has_column(&df, "beds"));
        assert!(matches!(
            require_series(&df, "beds"),
            Err(EtlError::ColumnNotFound(_))
        ));

        let price = require_series(&df, "price").unwrap();
        assert_eq!(optional_f64_values(price).unwrap(), vec![Some(10.0), None]);
        assert_eq!(present_f64_values(price).unwrap(), vec![10.0]);
    }
}
