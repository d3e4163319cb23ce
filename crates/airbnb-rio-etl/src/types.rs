use crate::pipeline::outliers::IqrBounds;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Median imputation applied to one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub median: f64,
    /// Number of missing values replaced by the median.
    pub filled: usize,
}

/// Result of the IQR outlier filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub bounds: IqrBounds,
    pub rows_before: usize,
    pub rows_after: usize,
}

impl OutlierSummary {
    /// Number of rows dropped by the filter.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Integer codes assigned to a categorical column.
///
/// `categories[i]` is the text value whose code is `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub column: String,
    pub code_column: String,
    pub categories: Vec<String>,
}

impl CategoryMapping {
    /// Code assigned to `value`, if it was seen.
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Population statistics used to z-score one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreRecord {
    pub column: String,
    pub z_column: String,
    pub mean: f64,
    pub std: f64,
    /// True when the std was zero or undefined and every z-score is 0.
    pub constant: bool,
}

/// Which allow-listed model columns were found in the cleaned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectionSummary {
    pub requested: Vec<String>,
    pub found: Vec<String>,
    pub missing: Vec<String>,
}

/// A single action taken during the run.
///
/// Actions give an audit trail of what was done to the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
}

impl PipelineAction {
    /// Create a new pipeline action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Types of actions that can be taken during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Listings and reviews were joined.
    TablesJoined,
    /// A column's data type was coerced.
    TypeCoerced,
    /// Missing values were imputed.
    ValueImputed,
    /// Outlier rows were removed.
    OutliersRemoved,
    /// Categories were encoded.
    CategoriesEncoded,
    /// Data was normalized.
    DataNormalized,
    /// The model table was projected.
    ColumnsProjected,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TablesJoined => "Tables Joined",
            Self::TypeCoerced => "Type Coerced",
            Self::ValueImputed => "Value Imputed",
            Self::OutliersRemoved => "Outliers Removed",
            Self::CategoriesEncoded => "Categories Encoded",
            Self::DataNormalized => "Data Normalized",
            Self::ColumnsProjected => "Columns Projected",
        }
    }
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
    /// Local timestamp when the run finished.
    pub generated_at: String,

    pub listings_rows: usize,
    pub reviews_rows: usize,
    pub joined_rows: usize,
    /// Rows of the cleaned table (after outlier removal).
    pub cleaned_rows: usize,
    pub cleaned_columns: usize,
    pub model_rows: usize,
    pub model_columns: Vec<String>,

    pub imputations: Vec<ImputationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers: Option<OutlierSummary>,
    pub categories: Vec<CategoryMapping>,
    pub normalizations: Vec<ZScoreRecord>,
    pub projection: ProjectionSummary,

    /// List of actions taken during the run.
    pub actions: Vec<PipelineAction>,
    /// Free-text processing steps, in order.
    pub processing_steps: Vec<String>,
    /// Warnings and notes generated during the run.
    pub warnings: Vec<String>,
}

impl PipelineSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: PipelineAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Percentage of joined rows dropped as outliers.
    pub fn outlier_percentage(&self) -> f32 {
        if self.joined_rows == 0 {
            0.0
        } else {
            let removed = self.joined_rows.saturating_sub(self.cleaned_rows);
            (removed as f32 / self.joined_rows as f32) * 100.0
        }
    }
}

/// Output of the cleaning stage.
#[derive(Debug, Clone)]
pub struct CleaningOutput {
    /// Joined, coerced, imputed, filtered, encoded and normalized table.
    pub cleaned: DataFrame,
    /// Outlier-column values of the raw joined table, missing values dropped.
    pub values_before: Vec<f64>,
    /// Outlier-column values after filtering.
    pub values_after: Vec<f64>,
    pub summary: PipelineSummary,
}

/// Output of the packaging stage.
#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub model: DataFrame,
    pub projection: ProjectionSummary,
    /// Text written to the delivery summary file.
    pub delivery_notes: String,
}

/// Everything a run produced, in memory.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub cleaned: DataFrame,
    pub model: DataFrame,
    pub values_before: Vec<f64>,
    pub values_after: Vec<f64>,
    pub delivery_notes: String,
    pub summary: PipelineSummary,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_summary_default() {
        let summary = PipelineSummary::default();
        assert_eq!(summary.duration_ms, 0);
        assert!(summary.outliers.is_none());
        assert!(summary.actions.is_empty());
    }

    #[test]
    fn test_outlier_percentage() {
        let mut summary = PipelineSummary::new();
        summary.joined_rows = 200;
        summary.cleaned_rows = 180;
        assert!((summary.outlier_percentage() - 10.0).abs() < 0.01);

        assert_eq!(PipelineSummary::new().outlier_percentage(), 0.0);
    }

    #[test]
    fn test_outlier_summary_rows_removed() {
        let summary = OutlierSummary {
            column: "price".to_string(),
            bounds: IqrBounds::from_quartiles(90.0, 110.0, 1.5),
            rows_before: 10,
            rows_after: 7,
        };
        assert_eq!(summary.rows_removed(), 3);
    }

    #[test]
    fn test_category_mapping_code_of() {
        let mapping = CategoryMapping {
            column: "room_type".to_string(),
            code_column: "room_type_code".to_string(),
            categories: vec![
                "Entire home/apt".to_string(),
                "Private room".to_string(),
                "Shared room".to_string(),
            ],
        };
        assert_eq!(mapping.code_of("Private room"), Some(1));
        assert_eq!(mapping.code_of("Hotel room"), None);
    }

    #[test]
    fn test_action_type_serialization() {
        let json = serde_json::to_string(&ActionType::OutliersRemoved).unwrap();
        assert_eq!(json, "\"outliers_removed\"");
        assert_eq!(ActionType::DataNormalized.display_name(), "Data Normalized");
    }

    #[test]
    fn test_summary_serialization_skips_missing_outliers() {
        let mut summary = PipelineSummary::new();
        summary.add_action(PipelineAction::new(
            ActionType::TablesJoined,
            "dataset",
            "Joined 3 rows",
        ));
        summary.add_warning("model column 'beds' missing");

        let json = serde_json::to_string(&summary).expect("Should serialize");
        assert!(!json.contains("\"outliers\""));
        assert!(json.contains("tables_joined"));
        assert!(json.contains("beds"));
    }
}
