//! Error types for the drift-guard validation library.
//!
//! Every failure a validation run can hit is represented by a variant of
//! [`DriftError`]. Each variant carries the context needed to diagnose the
//! failure without re-running: the file path, the column, or the phase of the
//! run it occurred in, plus the underlying cause where one exists.

use crate::core::ValidationPhase;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed underlying cause attached to an error variant.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for drift-guard.
#[derive(Error, Debug)]
pub enum DriftError {
    /// A dataset could not be read or parsed by the loader.
    #[error("Failed to load dataset '{}': {message}", path.display())]
    DatasetLoad {
        /// Path of the dataset that failed to load
        path: PathBuf,
        /// Detailed error message
        message: String,
        /// Underlying I/O or parse failure
        #[source]
        source: Option<BoxedSource>,
    },

    /// The expected schema could not be obtained.
    #[error("Failed to read schema from {location}: {message}")]
    SchemaRead {
        /// Where the schema was read from (file path or description)
        location: String,
        /// Detailed error message
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A statistical test failed in a way that leaves drift undetermined.
    #[error("Drift computation failed for column '{column}': {message}")]
    ColumnComputation {
        /// Name of the column being compared
        column: String,
        /// Detailed error message
        message: String,
    },

    /// The reference and current datasets have no column in common.
    #[error(
        "No comparable columns: {reference_columns} reference and {current_columns} current \
         column(s), none shared"
    )]
    EmptyComparison {
        reference_columns: usize,
        current_columns: usize,
    },

    /// The drift report could not be written.
    #[error(
        "Failed to persist drift report to '{}' after {attempts} attempt(s): {message}",
        path.display()
    )]
    ReportPersist {
        /// Destination path of the report
        path: PathBuf,
        /// Number of write attempts made
        attempts: usize,
        /// Detailed error message
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Drift detection exceeded the configured wall-clock limit.
    #[error("Drift detection did not finish within {timeout:?}")]
    DriftTimeout { timeout: Duration },

    /// Invalid configuration values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, DriftError>`.
pub type Result<T> = std::result::Result<T, DriftError>;

impl DriftError {
    /// Creates a dataset load error without an underlying cause.
    pub fn dataset_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DatasetLoad {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a dataset load error wrapping the underlying failure.
    pub fn dataset_load_with_source(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: BoxedSource,
    ) -> Self {
        Self::DatasetLoad {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a schema read error without an underlying cause.
    pub fn schema_read(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaRead {
            location: location.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a schema read error wrapping the underlying failure.
    pub fn schema_read_with_source(
        location: impl Into<String>,
        message: impl Into<String>,
        source: BoxedSource,
    ) -> Self {
        Self::SchemaRead {
            location: location.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a column computation error.
    pub fn column_computation(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ColumnComputation {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Returns the phase of a validation run in which this kind of error arises.
    pub fn phase(&self) -> ValidationPhase {
        match self {
            Self::DatasetLoad { .. } | Self::DataFusion(_) | Self::Arrow(_) => {
                ValidationPhase::LoadDatasets
            }
            Self::SchemaRead { .. } => ValidationPhase::CheckSchemas,
            Self::ColumnComputation { .. }
            | Self::EmptyComparison { .. }
            | Self::DriftTimeout { .. } => ValidationPhase::DetectDrift,
            Self::ReportPersist { .. } | Self::Io(_) | Self::Serialization(_) => {
                ValidationPhase::PersistReport
            }
            Self::Configuration(_) | Self::Internal(_) => ValidationPhase::Start,
        }
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DriftError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<DriftError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            DriftError::Internal(inner) => DriftError::Internal(format!("{msg}: {inner}")),
            other => DriftError::Internal(format!("{msg}: {other}")),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let msg = f();
            match e.into() {
                DriftError::Internal(inner) => DriftError::Internal(format!("{msg}: {inner}")),
                other => DriftError::Internal(format!("{msg}: {other}")),
            }
        })
    }
}
