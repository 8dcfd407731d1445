//! Orchestration of a validation run.
//!
//! ## Overview
//!
//! - **[`DataValidator`]**: loads the train and test datasets, checks both
//!   against the expected schema, compares them for drift and emits a
//!   [`ValidationArtifact`]
//! - **[`ValidationConfig`]**: report and invalid-data paths plus run policies
//! - **[`ValidationPhase`]**: the step a run is in, used to tag errors
//!
//! ## Phases
//!
//! ```text
//! START → LOAD_DATASETS → CHECK_SCHEMAS → DETECT_DRIFT → COMBINE
//!       → PERSIST_REPORT → EMIT_ARTIFACT → DONE
//! ```
//!
//! Any error ends the run in the phase it occurred in. No artifact is
//! produced for a failed run.

mod artifact;
mod config;
mod phase;
mod validator;

pub use artifact::{combine_validation_status, IngestionArtifact, ValidationArtifact};
pub use config::{DriftConfig, ValidationConfig};
pub use phase::ValidationPhase;
pub use validator::{DataValidator, DataValidatorBuilder, ValidationRun, DEFAULT_SCHEMA_FILE_PATH};
