//! CSV loading.

use crate::error::{EtlError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file with a header row.
///
/// The schema is inferred from the whole file. If inference fails (for
/// example a column that starts numeric and later holds text), the file is
/// re-read with every column as text; the numeric columns are coerced later
/// by the pipeline anyway.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(EtlError::FileNotFound(path.to_path_buf()));
    }

    // Strategy 1: full-file schema inference
    match CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            info!("Loaded {}: {:?}", path.display(), df.shape());
            return Ok(df);
        }
        Err(e) => {
            debug!("Schema inference failed for {}: {}", path.display(), e);
        }
    }

    // Strategy 2: everything as text
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("Failed to read {}", path.display()))?;

    info!("Loaded {} as text columns: {:?}", path.display(), df.shape());
    Ok(df)
}
