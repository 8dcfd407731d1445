//! Dataset loaders.
//!
//! A [`DatasetLoader`] turns a file path supplied by the ingestion stage into
//! an in-memory [`Dataset`]. [`CsvDatasetLoader`] reads delimited files with
//! DataFusion; [`InMemoryLoader`] serves pre-built datasets and is handy for
//! tests and for callers that already hold their data in memory.

use crate::dataset::Dataset;
use crate::prelude::*;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

mod csv;
mod memory;

pub use csv::{CsvDatasetLoader, CsvOptions};
pub use memory::InMemoryLoader;

/// Loads a tabular dataset from a path.
///
/// Implementations should report failures as [`DriftError::DatasetLoad`]
/// carrying the path and the underlying cause.
///
/// # Examples
///
/// ```rust,no_run
/// use drift_guard::sources::{CsvDatasetLoader, DatasetLoader};
/// use std::path::Path;
///
/// # async fn example() -> drift_guard::error::Result<()> {
/// let loader = CsvDatasetLoader::default();
/// let dataset = loader.load(Path::new("artifacts/ingested/train.csv")).await?;
/// println!("{} columns, {} rows", dataset.num_columns(), dataset.num_rows());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DatasetLoader: Debug + Send + Sync {
    /// Loads the dataset stored at `path`.
    async fn load(&self, path: &Path) -> Result<Dataset>;

    /// Returns a human-readable description of this loader.
    fn description(&self) -> String;
}
