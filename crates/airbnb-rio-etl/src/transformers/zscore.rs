//! Z-score standardization.

use super::z_column_name;
use crate::error::Result;
use crate::statistics;
use crate::types::ZScoreRecord;
use crate::utils::{optional_f64_values, require_series};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Adds standardized copies of numeric columns.
pub struct ZScoreNormalizer;

impl ZScoreNormalizer {
    /// Add `<col>_z = (x - mean) / std` for each column.
    ///
    /// Uses the population standard deviation over the rows currently in the
    /// table. When the std is zero or undefined every z-score is 0.
    /// A missing column is an error.
    pub fn normalize(
        df: &mut DataFrame,
        columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<ZScoreRecord>> {
        let mut records = Vec::with_capacity(columns.len());

        for col_name in columns {
            let values = optional_f64_values(require_series(df, col_name)?)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();

            let mean = statistics::mean(&present);
            let std = statistics::population_std(&present);
            let constant = std == 0.0 || std.is_nan();

            let z_values: Vec<Option<f64>> = values
                .iter()
                .map(|v| {
                    v.map(|x| if constant { 0.0 } else { (x - mean) / std })
                })
                .collect();

            let z_column = z_column_name(col_name);
            df.with_column(Series::new(z_column.as_str().into(), z_values))?;

            if constant {
                warn!(
                    "Column '{}' has zero or undefined std; '{}' set to 0",
                    col_name, z_column
                );
                processing_steps.push(format!(
                    "Standardized '{}' into '{}' (constant column, all zeros)",
                    col_name, z_column
                ));
            } else {
                processing_steps.push(format!(
                    "Standardized '{}' into '{}' (mean={:.2}, std={:.2})",
                    col_name, z_column, mean, std
                ));
            }
            debug!("z-score '{}': mean={} std={}", col_name, mean, std);

            records.push(ZScoreRecord {
                column: col_name.clone(),
                z_column,
                mean,
                std,
                constant,
            });
        }

        info!("Standardized {} numeric columns", records.len());
        Ok(records)
    }
}
