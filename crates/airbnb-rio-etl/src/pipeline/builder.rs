//! Main ETL pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning and packaging stages.

use crate::cleaner::TypeCoercer;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::ingest::{join_on_key, load_csv};
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::plotting::BoxplotRenderer;
use crate::reporting::{ModelProjection, ReportGenerator};
use crate::transformers::{CategoricalEncoder, ZScoreNormalizer, z_column_name};
use crate::types::{
    ActionType, CleaningOutput, PackageOutput, PipelineAction, PipelineResult, PipelineSummary,
};
use crate::utils::{column_names, present_f64_values, require_series};
use chrono::Local;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The listings ETL pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use airbnb_rio_etl::{Pipeline, PipelineConfig};
///
/// // Whole run: read inputs, clean, package, write artifacts
/// let result = Pipeline::builder().build()?.run()?;
///
/// // In memory, on already loaded tables
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().write_plots(false).build()?)
///     .build()?;
/// let cleaning = pipeline.clean(&listings, &reviews)?;
/// let package = pipeline.package(&cleaning.cleaned)?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    projection: ModelProjection,
    reporter: ReportGenerator,
    plotter: BoxplotRenderer,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read both input files, run both stages and write every artifact.
    pub fn run(&self) -> Result<PipelineResult> {
        self.finish(self.run_internal())
    }

    /// Run both stages on in-memory tables. Nothing is written.
    pub fn process(&self, listings: &DataFrame, reviews: &DataFrame) -> Result<PipelineResult> {
        self.finish(self.process_internal(listings, reviews, Instant::now()))
    }

    /// Report the terminal progress state and log failures.
    fn finish(&self, result: Result<PipelineResult>) -> Result<PipelineResult> {
        match result {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage_started(&self, stage: PipelineStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();

        self.stage_started(PipelineStage::Loading, "Loading input files...");
        let listings = load_csv(&self.config.listings_path())?;
        let reviews = load_csv(&self.config.reviews_path())?;
        info!(
            "Loaded {} listings and {} reviews",
            listings.height(),
            reviews.height()
        );

        let mut result = self.process_internal(&listings, &reviews, start_time)?;
        self.write_artifacts(&mut result, start_time)?;
        Ok(result)
    }

    fn process_internal(
        &self,
        listings: &DataFrame,
        reviews: &DataFrame,
        start_time: Instant,
    ) -> Result<PipelineResult> {
        let CleaningOutput {
            cleaned,
            values_before,
            values_after,
            mut summary,
        } = self.clean(listings, reviews)?;

        let PackageOutput {
            model,
            projection,
            delivery_notes,
        } = self.package(&cleaned)?;

        summary.model_rows = model.height();
        summary.model_columns = projection.found.clone();
        for col in &projection.missing {
            summary.add_warning(format!("Model column '{}' not found, skipped", col));
        }
        summary.add_action(PipelineAction::new(
            ActionType::ColumnsProjected,
            "dataset",
            format!(
                "Projected {} of {} model columns",
                projection.found.len(),
                projection.requested.len()
            ),
        ));
        summary.projection = projection;
        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        summary.generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        Ok(PipelineResult {
            cleaned,
            model,
            values_before,
            values_after,
            delivery_notes,
            summary,
        })
    }

    /// Cleaning stage: join, coerce, impute, filter outliers, encode, normalize.
    pub fn clean(&self, listings: &DataFrame, reviews: &DataFrame) -> Result<CleaningOutput> {
        let config = &self.config;
        let mut summary = PipelineSummary::new();
        let mut steps: Vec<String> = Vec::new();

        summary.listings_rows = listings.height();
        summary.reviews_rows = reviews.height();

        // Step 1: Join
        self.stage_started(PipelineStage::Joining, "Step 1: Joining listings and reviews...");
        let mut df = join_on_key(listings, reviews, &config.join_key, &config.join_suffix)?;
        summary.joined_rows = df.height();
        steps.push(format!(
            "Joined {} listings with {} reviews on '{}': {} rows",
            listings.height(),
            reviews.height(),
            config.join_key,
            df.height()
        ));
        summary.add_action(PipelineAction::new(
            ActionType::TablesJoined,
            config.join_key.as_str(),
            format!("Inner join produced {} rows", df.height()),
        ));

        let values_before = TypeCoercer::numeric_values(&df, &config.outlier_column)?;

        // Step 2: Type coercion
        self.stage_started(PipelineStage::TypeCoercion, "Step 2: Coercing column types...");
        TypeCoercer::coerce_numeric(&mut df, &config.numeric_columns, &mut steps)?;
        TypeCoercer::fill_categorical(
            &mut df,
            &config.categorical_columns,
            &config.categorical_fill,
            &mut steps,
        )?;
        summary.add_action(PipelineAction::new(
            ActionType::TypeCoerced,
            "dataset",
            format!("Coerced {} numeric columns to Float64", config.numeric_columns.len()),
        ));

        if df.height() == 0 {
            return self.clean_empty(df, values_before, summary, steps);
        }

        // Step 3: Median imputation
        self.stage_started(PipelineStage::Imputation, "Step 3: Imputing missing values...");
        let imputations =
            StatisticalImputer::apply_numeric_median(&mut df, &config.numeric_columns, &mut steps)?;
        for record in imputations.iter().filter(|r| r.filled > 0) {
            summary.add_action(PipelineAction::new(
                ActionType::ValueImputed,
                record.column.as_str(),
                format!("Filled {} values with median {}", record.filled, record.median),
            ));
        }
        summary.imputations = imputations;

        // Step 4: Outliers
        self.stage_started(
            PipelineStage::OutlierRemoval,
            "Step 4: Removing outliers (IQR)...",
        );
        let bounds =
            OutlierHandler::compute_bounds(&df, &config.outlier_column, config.iqr_multiplier)?;
        let outliers =
            OutlierHandler::remove_outliers(&mut df, &config.outlier_column, bounds, &mut steps)?;
        summary.add_action(PipelineAction::new(
            ActionType::OutliersRemoved,
            config.outlier_column.as_str(),
            format!(
                "Removed {} rows outside [{}, {}]",
                outliers.rows_removed(),
                bounds.lower,
                bounds.upper
            ),
        ));
        summary.outliers = Some(outliers);
        let values_after = present_f64_values(require_series(&df, &config.outlier_column)?)?;

        // Step 5: Categorical encoding
        self.stage_started(PipelineStage::Encoding, "Step 5: Encoding categories...");
        let categories =
            CategoricalEncoder::encode(&mut df, &config.categorical_columns, &mut steps)?;
        for mapping in &categories {
            summary.add_action(PipelineAction::new(
                ActionType::CategoriesEncoded,
                mapping.column.as_str(),
                format!("{} categories into '{}'", mapping.categories.len(), mapping.code_column),
            ));
        }
        summary.categories = categories;

        // Step 6: Normalization
        self.stage_started(PipelineStage::Normalization, "Step 6: Standardizing (z-score)...");
        let normalizations =
            ZScoreNormalizer::normalize(&mut df, &config.numeric_columns, &mut steps)?;
        for record in normalizations.iter().filter(|r| r.constant) {
            summary.add_warning(format!(
                "Column '{}' is constant; '{}' is all zeros",
                record.column, record.z_column
            ));
        }
        summary.add_action(PipelineAction::new(
            ActionType::DataNormalized,
            "dataset",
            format!("Added {} z-score columns", normalizations.len()),
        ));
        summary.normalizations = normalizations;

        summary.cleaned_rows = df.height();
        summary.cleaned_columns = df.width();
        summary.processing_steps = steps;

        info!(
            "Cleaning complete: {} rows x {} columns",
            df.height(),
            df.width()
        );

        Ok(CleaningOutput {
            cleaned: df,
            values_before,
            values_after,
            summary,
        })
    }

    /// Empty join: no statistics to compute, so the cleaned table keeps the
    /// full schema with zero rows.
    fn clean_empty(
        &self,
        mut df: DataFrame,
        values_before: Vec<f64>,
        mut summary: PipelineSummary,
        mut steps: Vec<String>,
    ) -> Result<CleaningOutput> {
        let config = &self.config;

        warn!(
            "Join on '{}' produced no rows; skipping median imputation, outlier removal and z-scores",
            config.join_key
        );
        summary.add_warning("Join produced no rows; the output tables are empty");

        self.stage_started(PipelineStage::Encoding, "Step 5: Encoding categories...");
        summary.categories =
            CategoricalEncoder::encode(&mut df, &config.categorical_columns, &mut steps)?;

        for col_name in &config.numeric_columns {
            let z_column = z_column_name(col_name);
            df.with_column(Series::new_empty(z_column.as_str().into(), &DataType::Float64))?;
        }
        steps.push(format!(
            "Added {} empty z-score columns (no rows to standardize)",
            config.numeric_columns.len()
        ));

        summary.cleaned_rows = 0;
        summary.cleaned_columns = df.width();
        summary.processing_steps = steps;

        Ok(CleaningOutput {
            cleaned: df,
            values_before,
            values_after: Vec::new(),
            summary,
        })
    }

    /// Packaging stage: project the cleaned table and build the delivery notes.
    pub fn package(&self, cleaned: &DataFrame) -> Result<PackageOutput> {
        self.stage_started(PipelineStage::Packaging, "Step 7: Building model table...");

        let (model, projection) = self.projection.project(cleaned)?;
        let delivery_notes = ReportGenerator::delivery_notes(
            &self.config,
            cleaned.height(),
            model.height(),
            &column_names(&model),
        );

        Ok(PackageOutput {
            model,
            projection,
            delivery_notes,
        })
    }

    fn write_artifacts(&self, result: &mut PipelineResult, start_time: Instant) -> Result<()> {
        self.stage_started(PipelineStage::Writing, "Step 8: Writing artifacts...");
        let files = &self.config.output_files;
        let total = 3 + 2 * usize::from(self.config.write_plots)
            + usize::from(self.config.write_report);
        let mut written = 0;

        self.reporter.ensure_output_dir()?;

        self.reporter.write_cleaned(&mut result.cleaned)?;
        written += 1;
        self.report_written(&files.cleaned_csv, written, total);

        self.reporter.write_model(&mut result.model)?;
        written += 1;
        self.report_written(&files.model_csv, written, total);

        if self.config.write_plots {
            let column = &self.config.outlier_column;
            self.plotter.render(
                &result.values_before,
                &format!("{} box plot (before IQR)", column),
                &self.reporter.path_of(&files.boxplot_before),
            )?;
            written += 1;
            self.report_written(&files.boxplot_before, written, total);

            self.plotter.render(
                &result.values_after,
                &format!("{} box plot (after IQR)", column),
                &self.reporter.path_of(&files.boxplot_after),
            )?;
            written += 1;
            self.report_written(&files.boxplot_after, written, total);
        }

        self.reporter.write_delivery_notes(&result.delivery_notes)?;
        written += 1;
        self.report_written(&files.summary_txt, written, total);

        result.summary.duration_ms = start_time.elapsed().as_millis() as u64;
        if self.config.write_report {
            self.reporter.write_report_json(&result.summary)?;
            written += 1;
            self.report_written(&files.report_json, written, total);
        }

        info!(
            "Wrote {} artifacts to {}",
            written,
            self.reporter.output_dir().display()
        );
        Ok(())
    }

    fn report_written(&self, file_name: &str, written: usize, total: usize) {
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Writing,
            format!("File: {}", file_name),
            written,
            total,
            format!("Wrote {}", file_name),
        ));
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| {
    ///         println!("[{:.0}%] {:?}: {}",
    ///             update.progress * 100.0,
    ///             update.stage,
    ///             update.message
    ///         );
    ///     })
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let projection = ModelProjection::new(config.model_columns.clone());
        let reporter = ReportGenerator::from_config(&config);
        let plotter = BoxplotRenderer::new(config.plot_width, config.plot_height);

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            projection,
            reporter,
            plotter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn listings() -> DataFrame {
        df![
            "id" => [1i64, 2, 3, 4, 5],
            "room_type" => [Some("Private room"), Some("Entire home/apt"), None, Some("Private room"), Some("Shared room")],
            "neighbourhood_cleansed" => ["Copacabana", "Leblon", "Ipanema", "Copacabana", "Leblon"],
            "accommodates" => [2i64, 4, 2, 3, 1],
            "bathrooms" => [Some(1.0), Some(2.0), None, Some(1.0), Some(1.0)],
            "bedrooms" => [1.0, 2.0, 1.0, 1.0, 1.0],
            "beds" => ["1", "2", "abc", "2", "1"],
            "price" => ["100", "120", "110", "90", "20000"],
            "number_of_reviews" => [10i64, 5, 0, 3, 1],
            "review_scores_rating" => [Some(4.5), None, Some(4.0), Some(4.8), Some(3.9)],
        ]
        .unwrap()
    }

    fn reviews() -> DataFrame {
        df![
            "id" => [1i64, 2, 3, 4, 5, 99],
            "reviewer" => ["ana", "bruno", "carla", "davi", "eva", "nobody"],
        ]
        .unwrap()
    }

    fn pipeline() -> Pipeline {
        let config = PipelineConfig::builder()
            .write_plots(false)
            .write_report(false)
            .build()
            .unwrap();
        Pipeline::builder().config(config).build().unwrap()
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
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().join_key, "id");
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.iqr_multiplier = -1.0;

        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_clean_end_to_end() {
        let output = pipeline().clean(&listings(), &reviews()).unwrap();
        let df = &output.cleaned;

        // id 99 unmatched, id 5 is a price outlier
        assert_eq!(output.summary.joined_rows, 5);
        assert_eq!(df.height(), 4);
        assert!(!floats(df, "price").contains(&20000.0));

        for col in &PipelineConfig::default().numeric_columns {
            assert_eq!(df.column(col).unwrap().null_count(), 0, "{}", col);
            assert!(df.column(&format!("{}_z", col)).is_ok());
        }
        assert!(df.column("room_type_code").is_ok());
        assert!(df.column("neighbourhood_cleansed_code").is_ok());
        assert!(df.column("reviewer").is_ok());
    }

    #[test]
    fn test_clean_imputes_before_filtering() {
        let output = pipeline().clean(&listings(), &reviews()).unwrap();

        // beds "abc" -> missing -> median of [1, 2, 2, 1] = 1.5
        let beds = output
            .summary
            .imputations
            .iter()
            .find(|r| r.column == "beds")
            .unwrap();
        assert_eq!(beds.median, 1.5);
        assert_eq!(beds.filled, 1);
        assert_eq!(floats(&output.cleaned, "beds")[2], 1.5);
    }

    #[test]
    fn test_clean_price_samples() {
        let output = pipeline().clean(&listings(), &reviews()).unwrap();

        assert_eq!(output.values_before, vec![100.0, 120.0, 110.0, 90.0, 20000.0]);
        assert_eq!(output.values_after, vec![100.0, 120.0, 110.0, 90.0]);
    }

    #[test]
    fn test_clean_fills_unknown_category() {
        let output = pipeline().clean(&listings(), &reviews()).unwrap();

        let room_types: Vec<&str> = output
            .cleaned
            .column("room_type")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(room_types[2], "Unknown");

        let mapping = &output.summary.categories[0];
        assert_eq!(mapping.column, "room_type");
        assert_eq!(
            mapping.categories,
            vec!["Entire home/apt", "Private room", "Unknown"]
        );
    }

    #[test]
    fn test_process_empty_join_yields_empty_tables() {
        let reviews = df![
            "id" => [98i64, 99],
            "reviewer" => ["nobody", "noone"],
        ]
        .unwrap();

        let result = pipeline().process(&listings(), &reviews).unwrap();

        assert_eq!(result.cleaned.height(), 0);
        assert_eq!(result.model.height(), 0);
        assert_eq!(
            column_names(&result.model),
            PipelineConfig::default().model_columns
        );
        assert!(result.cleaned.column("price_z").is_ok());
        assert_eq!(
            result.cleaned.column("price").unwrap().dtype(),
            &DataType::Float64
        );
        assert!(result.summary.outliers.is_none());
        assert!(result.values_after.is_empty());
        assert!(
            result
                .summary
                .warnings
                .iter()
                .any(|w| w.contains("Join produced no rows"))
        );
    }

    #[test]
    fn test_clean_missing_numeric_column_errors() {
        let listings = listings().drop("beds").unwrap();
        let result = pipeline().clean(&listings, &reviews());
        assert!(matches!(result, Err(EtlError::ColumnNotFound(c)) if c == "beds"));
    }

    #[test]
    fn test_package_projects_model_columns() {
        let pipeline = pipeline();
        let cleaning = pipeline.clean(&listings(), &reviews()).unwrap();
        let package = pipeline.package(&cleaning.cleaned).unwrap();

        assert_eq!(
            column_names(&package.model),
            PipelineConfig::default().model_columns
        );
        assert_eq!(package.model.height(), 4);
        assert!(package.projection.missing.is_empty());
        assert!(package.delivery_notes.contains("ROWS (model): 4"));
    }

    #[test]
    fn test_process_reports_progress() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let config = PipelineConfig::builder().write_plots(false).build().unwrap();
        let pipeline = Pipeline::builder()
            .config(config)
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let result = pipeline.process(&listings(), &reviews()).unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&PipelineStage::Joining));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
        assert!(stages.contains(&PipelineStage::Packaging));
        assert_eq!(result.summary.model_rows, 4);
        assert!(!result.summary.generated_at.is_empty());
    }

    #[test]
    fn test_process_failure_reports_failed() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |update| {
                stages_clone.lock().unwrap().push(update.stage);
            })
            .build()
            .unwrap();

        let reviews = df!["review_id" => [1i64]].unwrap();
        let result = pipeline.process(&listings(), &reviews);

        assert!(matches!(result, Err(EtlError::MissingKeyColumn { .. })));
        assert_eq!(stages.lock().unwrap().last(), Some(&PipelineStage::Failed));
    }
}
