//! Outlier handling module.
//!
//! Removes rows whose value in one column falls outside the IQR fences.

use crate::error::{EtlError, Result};
use crate::statistics;
use crate::types::OutlierSummary;
use crate::utils::{optional_f64_values, require_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Quartiles and Tukey fences of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Fences `[q1 - k*iqr, q3 + k*iqr]` from known quartiles.
    pub fn from_quartiles(q1: f64, q3: f64, multiplier: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    /// Fences computed from the 25th and 75th percentiles of `values`.
    /// `None` for an empty sample.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = statistics::sorted(values);
        let q1 = statistics::quantile_sorted(&sorted, 0.25)?;
        let q3 = statistics::quantile_sorted(&sorted, 0.75)?;
        Some(Self::from_quartiles(q1, q3, multiplier))
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Compute the IQR fences of a numeric column.
    pub fn compute_bounds(df: &DataFrame, column: &str, multiplier: f64) -> Result<IqrBounds> {
        let values: Vec<f64> = optional_f64_values(require_series(df, column)?)?
            .into_iter()
            .flatten()
            .collect();

        IqrBounds::from_values(&values, multiplier)
            .ok_or_else(|| EtlError::NoValidValues(column.to_string()))
    }

    /// Keep only rows whose `column` value lies within `bounds`.
    ///
    /// Single pass: the bounds are not recomputed on the filtered rows.
    /// Missing values are never within bounds.
    pub fn remove_outliers(
        df: &mut DataFrame,
        column: &str,
        bounds: IqrBounds,
        processing_steps: &mut Vec<String>,
    ) -> Result<OutlierSummary> {
        let rows_before = df.height();

        let mask_values: Vec<bool> = optional_f64_values(require_series(df, column)?)?
            .into_iter()
            .map(|v| v.is_some_and(|val| bounds.contains(val)))
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        *df = df.filter(&mask)?;

        let summary = OutlierSummary {
            column: column.to_string(),
            bounds,
            rows_before,
            rows_after: df.height(),
        };

        processing_steps.push(format!(
            "Removed {} rows with '{}' outside [{:.2}, {:.2}] (Q1={:.2}, Q3={:.2}, IQR={:.2})",
            summary.rows_removed(),
            column,
            bounds.lower,
            bounds.upper,
            bounds.q1,
            bounds.q3,
            bounds.iqr
        ));
        debug!("Outlier bounds for '{}': {:?}", column, bounds);
        info!(
            "Removed {} outlier rows ({} -> {})",
            summary.rows_removed(),
            rows_before,
            summary.rows_after
        );

        Ok(summary)
    }
}
