//! Progress reporting for the ETL pipeline.
//!
//! The pipeline runs synchronously; a [`ProgressReporter`] receives one
//! update at the start of each stage and one per file written.
//!
//! # Example
//!
//! ```rust,ignore
//! use airbnb_rio_etl::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the ETL pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the input CSV files
    Loading,
    /// Inner join of listings and reviews
    Joining,
    /// Numeric and categorical type coercion
    TypeCoercion,
    /// Median imputation of numeric columns
    Imputation,
    /// IQR filtering of the outlier column
    OutlierRemoval,
    /// Categorical code encoding
    Encoding,
    /// Z-score standardization
    Normalization,
    /// Projection onto the model columns
    Packaging,
    /// Writing artifacts to disk
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Joining => "Joining Tables",
            Self::TypeCoercion => "Coercing Types",
            Self::Imputation => "Imputing Values",
            Self::OutlierRemoval => "Removing Outliers",
            Self::Encoding => "Encoding Categories",
            Self::Normalization => "Normalizing",
            Self::Packaging => "Packaging Model Table",
            Self::Writing => "Writing Artifacts",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run taken by this stage (0.0 - 1.0).
    ///
    /// The non-terminal stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Joining => 0.10,
            Self::TypeCoercion => 0.10,
            Self::Imputation => 0.10,
            Self::OutlierRemoval => 0.15,
            Self::Encoding => 0.10,
            Self::Normalization => 0.10,
            Self::Packaging => 0.10,
            Self::Writing => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Joining => 0.10,
            Self::TypeCoercion => 0.20,
            Self::Imputation => 0.30,
            Self::OutlierRemoval => 0.40,
            Self::Encoding => 0.55,
            Self::Normalization => 0.65,
            Self::Packaging => 0.75,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Optional sub-stage description (e.g., "Column: price")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage without sub-stage info.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            items_processed: None,
            items_total: None,
        }
    }

    /// Creates a new progress update with item counts.
    pub fn with_items(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            sub_stage: Some(sub_stage.into()),
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::new(stage, stage_progress, message)
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, 0.0, message)
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

/// Receives progress updates from the pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary and after each artifact is written.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WORK_STAGES: [PipelineStage; 9] = [
        PipelineStage::Loading,
        PipelineStage::Joining,
        PipelineStage::TypeCoercion,
        PipelineStage::Imputation,
        PipelineStage::OutlierRemoval,
        PipelineStage::Encoding,
        PipelineStage::Normalization,
        PipelineStage::Packaging,
        PipelineStage::Writing,
    ];

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Joining, 0.5, "Joining...");
        assert_eq!(update.stage, PipelineStage::Joining);
        assert!(update.sub_stage.is_none());
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update = ProgressUpdate::with_items(
            PipelineStage::Imputation,
            "Column: beds",
            2,
            4,
            "Imputing beds",
        );
        assert_eq!(update.sub_stage, Some("Column: beds".to_string()));
        assert_eq!(update.stage_progress, 0.5);
        assert_eq!(update.items_processed, Some(2));
        assert_eq!(update.items_total, Some(4));
    }

    #[test]
    fn test_progress_update_terminal() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.stage, PipelineStage::Complete);
        assert_eq!(done.progress, 1.0);

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, PipelineStage::Failed);
        assert_eq!(failed.progress, 0.0);
    }

    #[test]
    fn test_stage_weights_sum() {
        let total_weight: f32 = WORK_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0;
        for stage in WORK_STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{:?}", stage);
            expected += stage.weight();
        }
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Loading, 0.0, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&PipelineStage::OutlierRemoval).unwrap();
        assert_eq!(json, "\"outlier_removal\"");
        assert_eq!(PipelineStage::Encoding.display_name(), "Encoding Categories");
    }
}
