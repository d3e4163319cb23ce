//! Data cleaning module.
//!
//! This module provides the type-coercion half of the cleaning stage:
//! - Converting the designated numeric columns to `Float64`
//! - Converting the designated categorical columns to text with a fill value
//!
//! Median imputation of the numeric columns lives in [`crate::imputers`].

mod converters;

use crate::error::{EtlError, Result};
use crate::utils::{has_column, present_f64_values, require_series};
use polars::prelude::*;
use tracing::{debug, info};

/// Coerces column types ahead of imputation.
pub struct TypeCoercer;

impl TypeCoercer {
    /// Convert every designated numeric column to `Float64`.
    ///
    /// Values that do not parse become null; nothing here fails on bad data.
    /// A designated column that is absent from the table is an error.
    pub fn coerce_numeric(
        df: &mut DataFrame,
        columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        for col_name in columns {
            let series = require_series(df, col_name)?;
            let nulls_before = series.null_count();
            let converted = converters::to_float64(series)?;
            let invalid = converted.null_count().saturating_sub(nulls_before);

            df.replace(col_name, converted)?;

            if invalid > 0 {
                processing_steps.push(format!(
                    "Coerced '{}' to numeric ({} unparseable values set to missing)",
                    col_name, invalid
                ));
            } else {
                processing_steps.push(format!("Coerced '{}' to numeric", col_name));
            }
            debug!("Coerced '{}' to Float64 ({} invalid)", col_name, invalid);
        }

        info!("Coerced {} numeric columns", columns.len());
        Ok(())
    }

    /// Numeric reading of a column that leaves the table untouched.
    ///
    /// Values are parsed as in [`coerce_numeric`](Self::coerce_numeric);
    /// missing and unparseable values are dropped.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
        let converted = converters::to_float64(require_series(df, column)?)?;
        present_f64_values(&converted)
    }

    /// Convert every present categorical column to text, filling nulls.
    ///
    /// Absent categorical columns are skipped.
    pub fn fill_categorical(
        df: &mut DataFrame,
        columns: &[String],
        fill_value: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        for col_name in columns {
            if !has_column(df, col_name) {
                debug!("Categorical column '{}' not present, skipping", col_name);
                continue;
            }

            let series = require_series(df, col_name)?;
            let missing = series.null_count();
            let filled = converters::to_filled_text(series, fill_value).map_err(|e| {
                EtlError::TypeConversionFailed {
                    column: col_name.clone(),
                    target_type: "String".to_string(),
                    reason: e.to_string(),
                }
            })?;

            df.replace(col_name, filled)?;

            processing_steps.push(format!(
                "Filled {} missing values in '{}' with '{}'",
                missing, col_name, fill_value
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_coerce_numeric_replaces_columns() {
        let mut df = df![
            "id" => [1i64, 2, 3],
            "price" => ["100", "oops", "300"],
            "beds" => [Some(1i64), None, Some(2)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        TypeCoercer::coerce_numeric(&mut df, &names(&["price", "beds"]), &mut steps).unwrap();

        let price = df.column("price").unwrap();
        assert_eq!(price.dtype(), &DataType::Float64);
        assert_eq!(price.null_count(), 1);
        assert_eq!(df.column("beds").unwrap().dtype(), &DataType::Float64);
        assert!(steps[0].contains("1 unparseable"));
    }

    #[test]
    fn test_coerce_numeric_missing_column_errors() {
        let mut df = df!["id" => [1i64]].unwrap();
        let mut steps = Vec::new();

        let result = TypeCoercer::coerce_numeric(&mut df, &names(&["price"]), &mut steps);
        assert!(matches!(result, Err(EtlError::ColumnNotFound(c)) if c == "price"));
    }

    #[test]
    fn test_numeric_values_drops_missing() {
        let df = df!["price" => [Some("100"), Some("n/a"), None, Some(" 250.5")]].unwrap();

        let values = TypeCoercer::numeric_values(&df, "price").unwrap();

        assert_eq!(values, vec![100.0, 250.5]);
        // source column unchanged
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_fill_categorical() {
        let mut df = df![
            "room_type" => [Some("Private room"), None, Some("Entire home/apt")],
        ]
        .unwrap();
        let mut steps = Vec::new();

        TypeCoercer::fill_categorical(
            &mut df,
            &names(&["room_type", "neighbourhood_cleansed"]),
            "Unknown",
            &mut steps,
        )
        .unwrap();

        let values: Vec<&str> = df
            .column("room_type")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec!["Private room", "Unknown", "Entire home/apt"]);
        // absent column skipped silently
        assert_eq!(steps.len(), 1);
    }
}
