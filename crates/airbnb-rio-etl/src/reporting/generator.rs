use crate::config::{OutputFiles, PipelineConfig};
use crate::error::{Result, ResultExt};
use crate::types::PipelineSummary;
use crate::utils::format_thousands;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the run artifacts into one output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
    files: OutputFiles,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf, files: OutputFiles) -> Self {
        Self { output_dir, files }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.output_dir.clone(), config.output_files.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Full path of an artifact inside the output directory.
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Create the output directory if it does not exist.
    pub fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory {}",
            self.output_dir.display()
        ))
    }

    pub fn write_cleaned(&self, df: &mut DataFrame) -> Result<PathBuf> {
        self.write_csv(df, &self.files.cleaned_csv)
    }

    pub fn write_model(&self, df: &mut DataFrame) -> Result<PathBuf> {
        self.write_csv(df, &self.files.model_csv)
    }

    /// Write a table as CSV with a header row and no index column.
    pub fn write_csv(&self, df: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        let output_path = self.path_of(file_name);
        let mut file = File::create(&output_path)
            .context(format!("Failed to create {}", output_path.display()))?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .context(format!("Failed to write {}", output_path.display()))?;

        info!(
            "Dataset saved: {} ({} rows)",
            output_path.display(),
            df.height()
        );
        Ok(output_path)
    }

    /// Write the delivery summary text file.
    pub fn write_delivery_notes(&self, notes: &str) -> Result<PathBuf> {
        let path = self.path_of(&self.files.summary_txt);
        fs::write(&path, notes).context(format!("Failed to write {}", path.display()))?;
        info!("Delivery summary saved: {}", path.display());
        Ok(path)
    }

    /// Write the machine-readable run report.
    pub fn write_report_json(&self, summary: &PipelineSummary) -> Result<PathBuf> {
        let path = self.path_of(&self.files.report_json);
        let mut file = File::create(&path)?;
        file.write_all(serde_json::to_string_pretty(summary)?.as_bytes())?;

        info!("Report saved: {}", path.display());
        Ok(path)
    }

    /// Build the delivery summary text.
    ///
    /// Lists the artifacts, the row counts of both tables, the model
    /// columns and the transformations that were applied.
    pub fn delivery_notes(
        config: &PipelineConfig,
        cleaned_rows: usize,
        model_rows: usize,
        model_columns: &[String],
    ) -> String {
        let files = &config.output_files;
        let mut lines = vec![
            "Airbnb Rio de Janeiro - Final Delivery".to_string(),
            String::new(),
            "Files:".to_string(),
            format!("- {}  (cleaned dataset + normalized columns)", files.cleaned_csv),
            format!("- {}    (compact dataset for modeling)", files.model_csv),
        ];
        if config.write_plots {
            lines.push(format!("- {} / {}", files.boxplot_before, files.boxplot_after));
        }
        if config.write_report {
            lines.push(format!("- {}  (machine-readable run report)", files.report_json));
        }

        lines.extend([
            String::new(),
            format!("ROWS (full): {}", format_thousands(cleaned_rows)),
            format!("ROWS (model): {}", format_thousands(model_rows)),
            String::new(),
            format!("COLUMNS (model): {}", model_columns.join(", ")),
            String::new(),
            "Notes:".to_string(),
            format!(
                "- {} outliers removed with the IQR rule ({} x IQR).",
                config.outlier_column, config.iqr_multiplier
            ),
            "- Categorical columns encoded as integer codes (sorted category order).".to_string(),
            "- Numeric columns standardized (z-score) in the cleaned CSV.".to_string(),
        ]);

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn generator(dir: &Path) -> ReportGenerator {
        ReportGenerator::new(dir.to_path_buf(), OutputFiles::default())
    }

    #[test]
    fn test_write_csv_has_header_and_no_index() {
        let dir = tempdir().unwrap();
        let mut df = df![
            "id" => [1i64, 2],
            "room_type" => ["Private room", "Entire home/apt"],
        ]
        .unwrap();

        let path = generator(dir.path()).write_cleaned(&mut df).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "id,room_type");
        assert_eq!(lines[1], "1,Private room");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let generator = ReportGenerator::new(nested.clone(), OutputFiles::default());

        generator.ensure_output_dir().unwrap();
        assert!(nested.is_dir());
        // idempotent
        generator.ensure_output_dir().unwrap();
    }

    #[test]
    fn test_write_report_json() {
        let dir = tempdir().unwrap();
        let mut summary = PipelineSummary::new();
        summary.joined_rows = 42;

        let path = generator(dir.path()).write_report_json(&summary).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(value["joined_rows"], 42);
    }

    #[test]
    fn test_delivery_notes_content() {
        let config = PipelineConfig::default();
        let columns = vec!["id".to_string(), "price".to_string()];

        let notes = ReportGenerator::delivery_notes(&config, 12345, 999, &columns);

        assert!(notes.starts_with("Airbnb Rio de Janeiro - Final Delivery"));
        assert!(notes.contains("ROWS (full): 12,345"));
        assert!(notes.contains("ROWS (model): 999"));
        assert!(notes.contains("COLUMNS (model): id, price"));
        assert!(notes.contains("airbnb_rio_model.csv"));
        assert!(notes.contains("boxplot_price_before.png"));
        assert!(notes.contains("IQR"));
        assert!(notes.contains("z-score"));
    }

    #[test]
    fn test_delivery_notes_without_plots() {
        let config = PipelineConfig::builder().write_plots(false).build().unwrap();
        let notes = ReportGenerator::delivery_notes(&config, 1, 1, &[]);
        assert!(!notes.contains(".png"));
    }

    #[test]
    fn test_write_delivery_notes() {
        let dir = tempdir().unwrap();
        let path = generator(dir.path()).write_delivery_notes("hello").unwrap();

        assert!(path.ends_with("README_ENTREGA.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }
}
