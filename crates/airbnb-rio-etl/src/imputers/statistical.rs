//! Statistical imputation methods.
//!
//! Provides median imputation for the numeric columns.

use crate::error::{EtlError, Result};
use crate::statistics;
use crate::types::ImputationRecord;
use crate::utils::{optional_f64_values, require_series};
use polars::prelude::*;
use tracing::{debug, info};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing values of each column with that column's median.
    ///
    /// Medians are computed from the values present before any filling.
    /// Every column is checked first: if any has no present values the
    /// table is left untouched and [`EtlError::NoValidValues`] is returned.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<ImputationRecord>> {
        let mut planned = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = optional_f64_values(require_series(df, col_name)?)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let median = statistics::median(&present)
                .ok_or_else(|| EtlError::NoValidValues(col_name.clone()))?;
            planned.push((col_name, values, median));
        }

        let mut records = Vec::with_capacity(planned.len());
        for (col_name, values, median) in planned {
            let filled = values.iter().filter(|v| v.is_none()).count();
            Self::fill_with_value(df, col_name, &values, median)?;

            processing_steps.push(format!(
                "Filled {} missing values in '{}' with median: {:.2}",
                filled, col_name, median
            ));
            debug!("Imputed '{}' with median {} ({} filled)", col_name, median, filled);

            records.push(ImputationRecord {
                column: col_name.clone(),
                median,
                filled,
            });
        }

        info!("Median-imputed {} numeric columns", records.len());
        Ok(records)
    }

    /// Replace a numeric column with its values, nulls replaced by `fill_value`.
    fn fill_with_value(
        df: &mut DataFrame,
        col_name: &str,
        values: &[Option<f64>],
        fill_value: f64,
    ) -> Result<()> {
        let result: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
        df.replace(col_name, Series::new(col_name.into(), result))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn floats(df: &DataFrame, col: &str) -> Vec<f64> {
        df.column(col)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn test_apply_numeric_median_basic() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let records =
            StatisticalImputer::apply_numeric_median(&mut df, &names(&["values"]), &mut steps)
                .unwrap();

        assert_eq!(df.column("values").unwrap().null_count(), 0);
        assert_eq!(floats(&df, "values"), vec![1.0, 3.0, 3.0, 3.0, 5.0]);
        assert_eq!(records[0].median, 3.0);
        assert_eq!(records[0].filled, 2);
        assert!(steps[0].contains("median"));
    }

    #[test]
    fn test_median_uses_present_values_only() {
        // even count of present values: median is the mean of the middle pair
        let mut df = df![
            "beds" => [Some(1.0), Some(2.0), None, Some(4.0), Some(10.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let records =
            StatisticalImputer::apply_numeric_median(&mut df, &names(&["beds"]), &mut steps)
                .unwrap();

        assert_eq!(records[0].median, 3.0);
        assert_eq!(floats(&df, "beds")[2], 3.0);
    }

    #[test]
    fn test_columns_imputed_independently() {
        let mut df = df![
            "a" => [Some(1.0), None, Some(3.0)],
            "b" => [None, Some(10.0), Some(20.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, &names(&["a", "b"]), &mut steps)
            .unwrap();

        assert_eq!(floats(&df, "a"), vec![1.0, 2.0, 3.0]);
        assert_eq!(floats(&df, "b"), vec![15.0, 10.0, 20.0]);
    }

    #[test]
    fn test_no_missing_values_unchanged() {
        let mut df = df!["price" => [10.0, 20.0]].unwrap();
        let mut steps = Vec::new();

        let records =
            StatisticalImputer::apply_numeric_median(&mut df, &names(&["price"]), &mut steps)
                .unwrap();

        assert_eq!(records[0].filled, 0);
        assert_eq!(floats(&df, "price"), vec![10.0, 20.0]);
    }

    #[test]
    fn test_entirely_missing_column_is_fatal_before_any_fill() {
        let mut df = df![
            "a" => [Some(1.0), None],
            "b" => [None::<f64>, None],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let result =
            StatisticalImputer::apply_numeric_median(&mut df, &names(&["a", "b"]), &mut steps);

        assert!(matches!(result, Err(EtlError::NoValidValues(c)) if c == "b"));
        // column "a" was validated but not filled
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert!(steps.is_empty());
    }
}
