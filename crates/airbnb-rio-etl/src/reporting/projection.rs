//! Projection of the cleaned table onto the model column allow-list.

use crate::error::Result;
use crate::types::ProjectionSummary;
use crate::utils::has_column;
use polars::prelude::*;
use tracing::{info, warn};

/// Ordered allow-list of the columns kept for modeling.
#[derive(Debug, Clone)]
pub struct ModelProjection {
    columns: Vec<String>,
}

impl ModelProjection {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Select the allow-listed columns, in allow-list order.
    ///
    /// Columns absent from `df` are skipped and reported, never an error.
    pub fn project(&self, df: &DataFrame) -> Result<(DataFrame, ProjectionSummary)> {
        let (found, missing): (Vec<String>, Vec<String>) = self
            .columns
            .iter()
            .cloned()
            .partition(|c| has_column(df, c));

        for col in &missing {
            warn!("Model column '{}' not found in cleaned table, skipping", col);
        }

        let projected = df.select(found.iter().map(|c| c.as_str()))?;
        info!(
            "Projected model table: {} rows x {} columns",
            projected.height(),
            projected.width()
        );

        let summary = ProjectionSummary {
            requested: self.columns.clone(),
            found,
            missing,
        };
        Ok((projected, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;
    use pretty_assertions::assert_eq;

    fn projection(cols: &[&str]) -> ModelProjection {
        ModelProjection::new(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_project_keeps_allow_list_order() {
        let df = df![
            "price" => [1.0, 2.0],
            "extra" => ["a", "b"],
            "id" => [1i64, 2],
        ]
        .unwrap();

        let (projected, summary) = projection(&["id", "price"]).project(&df).unwrap();

        assert_eq!(column_names(&projected), vec!["id", "price"]);
        assert_eq!(projected.height(), 2);
        assert!(summary.missing.is_empty());
    }

    #[test]
    fn test_project_skips_missing_columns() {
        let df = df![
            "id" => [1i64],
            "price" => [1.0],
        ]
        .unwrap();

        let (projected, summary) = projection(&["id", "bathrooms", "price"]).project(&df).unwrap();

        assert_eq!(column_names(&projected), vec!["id", "price"]);
        assert_eq!(summary.found, vec!["id", "price"]);
        assert_eq!(summary.missing, vec!["bathrooms"]);
        assert_eq!(summary.requested.len(), 3);
    }

    #[test]
    fn test_project_nothing_found() {
        let df = df!["other" => [1i64]].unwrap();

        let (projected, summary) = projection(&["id"]).project(&df).unwrap();

        assert_eq!(projected.width(), 0);
        assert_eq!(summary.missing, vec!["id"]);
    }
}
