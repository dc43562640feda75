//! Custom error types for the transformation pipeline engine.
//!
//! This module provides the error hierarchy using `thiserror`. Every failure
//! during pipeline construction or invocation is a hard stop carrying the
//! name of the offending unit, column, or configuration key; the engine never
//! silently skips a failed unit or substitutes a default output.

use thiserror::Error;

/// The main error type for pipeline construction and invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A second factory tried to register under a name already taken.
    #[error("unit '{0}' is already registered")]
    DuplicateUnit(String),

    /// Configuration references a name with no registered factory.
    #[error("no unit registered under name '{0}'")]
    UnknownUnit(String),

    /// A resolved factory rejected the arguments bound to it.
    #[error("failed to construct unit '{unit}': {source}")]
    Construction {
        unit: String,
        #[source]
        source: serde_json::Error,
    },

    /// A referenced column is absent from the input frame.
    #[error("column '{0}' not found in input frame")]
    ColumnNotFound(String),

    /// A unit with the wrong output kind was placed in a fan-out.
    #[error("unit '{unit}' rewrites its input and cannot be used in a concat fan-out")]
    KindMismatch { unit: String },

    /// A fitted encoder met a value it never learned.
    #[error("value '{value}' in column '{column}' was not seen during fitting")]
    UnknownCategory { column: String, value: String },

    /// A string column value could not be parsed as a datetime.
    #[error("could not parse '{value}' in column '{column}' as a datetime")]
    DatetimeParse { column: String, value: String },

    /// A stateful unit had nothing to learn parameters from.
    #[error("no non-null values in column '{0}' to learn parameters from")]
    NoValidValues(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Walk through `WithContext` wrappers to the underlying error.
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

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
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}
