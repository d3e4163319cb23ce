//! Categorical code encoding.

use super::code_column_name;
use crate::error::{EtlError, Result};
use crate::types::CategoryMapping;
use crate::utils::{has_column, require_series};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Code written for a missing category value.
pub const MISSING_CODE: i32 = -1;

/// Encodes text columns as integer category codes.
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    /// Add a `<col>_code` column for each present categorical column.
    ///
    /// Categories are the distinct values of the column sorted lexically;
    /// a value's code is its index in that order. Absent columns are skipped.
    pub fn encode(
        df: &mut DataFrame,
        columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<Vec<CategoryMapping>> {
        let mut mappings = Vec::new();

        for col_name in columns {
            if !has_column(df, col_name) {
                debug!("Categorical column '{}' not present, not encoding", col_name);
                continue;
            }

            let text = require_series(df, col_name)?
                .cast(&DataType::String)
                .map_err(|e| EtlError::TypeConversionFailed {
                    column: col_name.clone(),
                    target_type: "String".to_string(),
                    reason: e.to_string(),
                })?;
            let values: Vec<Option<&str>> = text.str()?.into_iter().collect();

            let categories: Vec<String> = values
                .iter()
                .flatten()
                .copied()
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_string)
                .collect();

            let mapping = CategoryMapping {
                column: col_name.clone(),
                code_column: code_column_name(col_name),
                categories,
            };

            let codes: Vec<i32> = values
                .iter()
                .map(|v| {
                    v.and_then(|s| mapping.code_of(s))
                        .map_or(MISSING_CODE, |code| code as i32)
                })
                .collect();

            df.with_column(Series::new(mapping.code_column.as_str().into(), codes))?;

            processing_steps.push(format!(
                "Encoded '{}' into '{}' ({} categories)",
                col_name,
                mapping.code_column,
                mapping.categories.len()
            ));
            debug!("Categories of '{}': {:?}", col_name, mapping.categories);

            mappings.push(mapping);
        }

        info!("Encoded {} categorical columns", mappings.len());
        Ok(mappings)
    }
}
