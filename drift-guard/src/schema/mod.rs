//! Expected dataset schema and the sources it can be read from.
//!
//! The schema is read once when a validator is built and is immutable
//! afterwards. The YAML layout accepted by [`YamlSchemaSource`] is:
//!
//! ```yaml
//! columns:
//!   - age: int
//!   - city: category
//!   - id            # type is optional
//! numerical_columns: [age]
//! categorical_columns: [city]
//! ```

mod checker;

pub use checker::{SchemaCheckOutcome, SchemaChecker, SchemaMode};

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A column the dataset is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }

    pub fn with_type(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type.into()),
        }
    }
}

/// Ordered list of expected columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<SchemaColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    numerical_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    categorical_columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<SchemaColumn>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Builds an untyped schema from column names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(SchemaColumn::new).collect())
    }

    /// Parses the YAML schema layout.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: RawSchema = serde_yaml::from_str(yaml)?;
        raw.try_into()
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numerical_columns(&self) -> &[String] {
        &self.numerical_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    columns: Vec<RawColumn>,
    #[serde(default)]
    numerical_columns: Vec<String>,
    #[serde(default)]
    categorical_columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColumn {
    Name(String),
    Typed(BTreeMap<String, String>),
}

impl TryFrom<RawSchema> for Schema {
    type Error = DriftError;

    fn try_from(raw: RawSchema) -> Result<Self> {
        let mut columns = Vec::with_capacity(raw.columns.len());
        for entry in raw.columns {
            match entry {
                RawColumn::Name(name) => columns.push(SchemaColumn::new(name)),
                RawColumn::Typed(map) => {
                    if map.len() != 1 {
                        return Err(DriftError::Serialization(format!(
                            "schema column entries must map one name to one type, got {} entries",
                            map.len()
                        )));
                    }
                    columns.extend(
                        map.into_iter()
                            .map(|(name, data_type)| SchemaColumn::with_type(name, data_type)),
                    );
                }
            }
        }

        Ok(Self {
            columns,
            numerical_columns: raw.numerical_columns,
            categorical_columns: raw.categorical_columns,
        })
    }
}

/// Provides the expected schema for a validation run.
pub trait SchemaSource: Debug + Send + Sync {
    /// Reads the schema. Failures are reported as [`DriftError::SchemaRead`].
    fn read_schema(&self) -> Result<Schema>;
}

impl SchemaSource for Schema {
    fn read_schema(&self) -> Result<Schema> {
        Ok(self.clone())
    }
}

/// Reads the schema from a YAML file.
#[derive(Debug, Clone)]
pub struct YamlSchemaSource {
    path: PathBuf,
}

impl YamlSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaSource for YamlSchemaSource {
    #[instrument(skip(self), fields(schema.path = %self.path.display()))]
    fn read_schema(&self) -> Result<Schema> {
        let location = self.path.display().to_string();
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            DriftError::schema_read_with_source(
                location.clone(),
                "could not read schema file",
                Box::new(e),
            )
        })?;

        let schema = Schema::from_yaml_str(&contents).map_err(|e| {
            DriftError::schema_read_with_source(
                location.clone(),
                "schema file is not valid",
                Box::new(e),
            )
        })?;

        if schema.column_count() == 0 {
            return Err(DriftError::schema_read(location, "schema lists no columns"));
        }

        debug!(columns = schema.column_count(), "Schema loaded");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCHEMA_YAML: &str = r#"
columns:
  - age: int
  - city: category
  - id
numerical_columns:
  - age
categorical_columns:
  - city
"#;

    #[test]
    fn test_parse_yaml_schema() {
        let schema = Schema::from_yaml_str(SCHEMA_YAML).unwrap();
        assert_eq!(schema.column_count(), 3);
        assert_eq!(schema.column_names(), vec!["age", "city", "id"]);
        assert_eq!(schema.columns()[0], SchemaColumn::with_type("age", "int"));
        assert_eq!(schema.columns()[2], SchemaColumn::new("id"));
        assert_eq!(schema.numerical_columns(), &["age".to_string()]);
        assert_eq!(schema.categorical_columns(), &["city".to_string()]);
    }

    #[test]
    fn test_multi_entry_column_is_rejected() {
        let yaml = "columns:\n  - {age: int, city: category}\n";
        assert!(Schema::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_yaml_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA_YAML.as_bytes()).unwrap();

        let schema = YamlSchemaSource::new(file.path()).read_schema().unwrap();
        assert_eq!(schema.column_count(), 3);
    }

    #[test]
    fn test_yaml_source_missing_file() {
        let err = YamlSchemaSource::new("/nonexistent/schema.yaml")
            .read_schema()
            .unwrap_err();
        assert!(matches!(err, DriftError::SchemaRead { .. }));
    }

    #[test]
    fn test_yaml_source_rejects_empty_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"columns: []\n").unwrap();

        let err = YamlSchemaSource::new(file.path()).read_schema().unwrap_err();
        assert!(matches!(err, DriftError::SchemaRead { .. }));
    }

    #[test]
    fn test_static_schema_source() {
        let schema = Schema::from_names(["a", "b"]);
        assert_eq!(schema.read_schema().unwrap(), schema);
    }
}
