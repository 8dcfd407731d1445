//! Prelude for commonly used types and traits in drift-guard.

pub use crate::core::{
    DataValidator, DriftConfig, IngestionArtifact, ValidationArtifact, ValidationConfig,
    ValidationPhase,
};
pub use crate::drift::{DriftReport, StatTestThresholds};
pub use crate::error::{DriftError, ErrorContext, Result};
pub use crate::logging::LogConfig;
