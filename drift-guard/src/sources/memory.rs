//! Loader backed by datasets already held in memory.

use super::DatasetLoader;
use crate::dataset::Dataset;
use crate::prelude::*;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Serves datasets registered under a path.
///
/// Loading a path that was never registered fails like a missing file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    datasets: HashMap<PathBuf, Dataset>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dataset under `path`, replacing any previous one.
    pub fn with_dataset(mut self, path: impl Into<PathBuf>, dataset: Dataset) -> Self {
        self.datasets.insert(path.into(), dataset);
        self
    }
}

#[async_trait]
impl DatasetLoader for InMemoryLoader {
    async fn load(&self, path: &Path) -> Result<Dataset> {
        self.datasets
            .get(path)
            .cloned()
            .ok_or_else(|| DriftError::dataset_load(path, "no dataset registered for this path"))
    }

    fn description(&self) -> String {
        let count = self.datasets.len();
        format!("In-memory datasets: {count} registered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;

    #[tokio::test]
    async fn test_registered_dataset_is_served() {
        let dataset = Dataset::try_new(vec![Column::numeric("a", [1.0])]).unwrap();
        let loader = InMemoryLoader::new().with_dataset("train.csv", dataset.clone());

        assert_eq!(loader.load(Path::new("train.csv")).await.unwrap(), dataset);
        assert!(loader.description().contains("1 registered"));
    }

    #[tokio::test]
    async fn test_unknown_path_fails() {
        let err = InMemoryLoader::new()
            .load(Path::new("missing.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriftError::DatasetLoad { .. }));
    }
}
