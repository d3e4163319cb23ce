//! Type conversion functions for data cleaning.

use crate::utils::{is_numeric_dtype, parse_numeric_string};
use polars::prelude::*;

/// Convert any column to `Float64`, turning everything unparseable into null.
///
/// Text is trimmed and parsed strictly; numeric and boolean columns are cast.
/// NaN never survives the conversion.
pub(crate) fn to_float64(series: &Series) -> PolarsResult<Series> {
    let values: Vec<Option<f64>> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_numeric_string))
            .collect(),
        dtype if is_numeric_dtype(dtype) || matches!(dtype, DataType::Boolean) => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect(),
        DataType::Null => vec![None; series.len()],
        _ => {
            let as_text = series.cast(&DataType::String)?;
            as_text
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_numeric_string))
                .collect()
        }
    };

    Ok(Series::new(series.name().clone(), values))
}

/// Convert a column to text and fill nulls with `fill_value`.
pub(crate) fn to_filled_text(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let as_text = series.cast(&DataType::String)?;
    let values: Vec<String> = as_text
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value).to_string())
        .collect();

    Ok(Series::new(series.name().clone(), values))
}
