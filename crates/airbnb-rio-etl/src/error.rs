//! Custom error types for the listings ETL pipeline.
//!
//! This module provides a single error hierarchy using `thiserror`
//! so every stage reports failures the same way.
//!
//! Errors are serializable, allowing them to be embedded in the JSON run
//! report or forwarded to another process as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ETL pipeline.
#[derive(Error, Debug)]
pub enum EtlError {
    /// An input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The join key is missing from one of the inputs.
    #[error("Key column '{column}' is missing from the {table} table")]
    MissingKeyColumn { table: String, column: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EtlError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through context wrapping.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::MissingKeyColumn { .. } => "MISSING_KEY_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Image(_) => "IMAGE_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a schema problem with the input data
    /// (as opposed to an environment failure such as I/O).
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::MissingKeyColumn { .. } | Self::ColumnNotFound(_) | Self::NoValidValues(_) => {
                true
            }
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for EtlError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EtlError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Io(e).with_context(context))
    }
}
