//! In-memory tabular datasets compared by the drift engine.
//!
//! A [`Dataset`] is an ordered sequence of named [`Column`]s of equal length.
//! Loaders build datasets from Arrow record batches; tests usually build them
//! directly with [`Dataset::try_new`].

use crate::prelude::*;
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Logical type of a column for the purpose of drift testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-missing value is a number
    Numeric,
    /// At least one non-missing value is not a number
    Categorical,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// Values held by a column. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    /// Number of rows, missing values included.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Creates a column from raw values.
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a numeric column with no missing values.
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(
            name,
            ColumnValues::Numeric(values.into_iter().map(Some).collect()),
        )
    }

    /// Creates a text column with no missing values.
    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnValues::Text(values.into_iter().map(|v| Some(v.into())).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing values.
    pub fn missing_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(values) => values
                .iter()
                .filter(|v| v.map_or(true, f64::is_nan))
                .count(),
            ColumnValues::Text(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Classifies the column: numeric if every non-missing value is a number.
    pub fn column_type(&self) -> ColumnType {
        match &self.values {
            ColumnValues::Numeric(_) => ColumnType::Numeric,
            ColumnValues::Text(values) => {
                let all_parse = values
                    .iter()
                    .flatten()
                    .all(|v| v.trim().parse::<f64>().is_ok());
                if all_parse {
                    ColumnType::Numeric
                } else {
                    ColumnType::Categorical
                }
            }
        }
    }

    /// Non-missing values as numbers, or `None` if the column is categorical.
    ///
    /// NaN is treated as missing.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match &self.values {
            ColumnValues::Numeric(values) => {
                Some(values.iter().flatten().copied().filter(|v| !v.is_nan()).collect())
            }
            ColumnValues::Text(values) => {
                let mut parsed = Vec::with_capacity(values.len());
                for value in values.iter().flatten() {
                    let number = value.trim().parse::<f64>().ok()?;
                    if !number.is_nan() {
                        parsed.push(number);
                    }
                }
                Some(parsed)
            }
        }
    }

    /// Non-missing values rendered as category labels.
    pub fn categorical_values(&self) -> Vec<String> {
        match &self.values {
            ColumnValues::Numeric(values) => values
                .iter()
                .flatten()
                .filter(|v| !v.is_nan())
                .map(|v| v.to_string())
                .collect(),
            ColumnValues::Text(values) => values.iter().flatten().cloned().collect(),
        }
    }

    /// Builds a column from a single Arrow array.
    ///
    /// Numeric Arrow types become [`ColumnValues::Numeric`]; booleans and
    /// everything else are rendered as text. Empty strings are missing.
    pub fn from_arrow(name: impl Into<String>, array: &ArrayRef) -> Result<Self> {
        let name = name.into();
        let data_type = array.data_type();

        let values = if data_type.is_numeric() {
            let cast = arrow::compute::cast(array, &DataType::Float64)?;
            let floats = cast
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    DriftError::Internal(format!("column '{name}' did not cast to Float64"))
                })?;
            ColumnValues::Numeric(floats.iter().collect())
        } else if let Some(booleans) = array.as_any().downcast_ref::<BooleanArray>() {
            ColumnValues::Text(booleans.iter().map(|v| v.map(|b| b.to_string())).collect())
        } else {
            let cast = arrow::compute::cast(array, &DataType::Utf8)?;
            let strings = cast
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    DriftError::Internal(format!("column '{name}' did not cast to Utf8"))
                })?;
            ColumnValues::Text(
                strings
                    .iter()
                    .map(|v| v.filter(|s| !s.is_empty()).map(str::to_string))
                    .collect(),
            )
        };

        Ok(Self { name, values })
    }
}

/// An ordered collection of equally sized, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Creates a dataset, rejecting duplicate names and ragged columns.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(DriftError::Configuration(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        if let Some(first) = columns.first() {
            let rows = first.len();
            if let Some(ragged) = columns.iter().find(|c| c.len() != rows) {
                return Err(DriftError::Configuration(format!(
                    "column '{}' has {} rows, expected {rows}",
                    ragged.name(),
                    ragged.len()
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Creates a dataset with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Converts collected Arrow record batches into a dataset.
    pub fn from_record_batches(schema: &Schema, batches: &[RecordBatch]) -> Result<Self> {
        let mut columns = Vec::with_capacity(schema.fields().len());

        for (index, field) in schema.fields().iter().enumerate() {
            let array = if batches.is_empty() {
                arrow::array::new_empty_array(field.data_type())
            } else {
                let parts: Vec<&dyn Array> =
                    batches.iter().map(|b| b.column(index).as_ref()).collect();
                arrow::compute::concat(&parts)?
            };
            columns.push(Column::from_arrow(field.name().clone(), &array)?);
        }

        Self::try_new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row count; zero for a dataset without columns.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::Field;
    use std::sync::Arc;

    #[test]
    fn test_text_column_of_numbers_is_numeric() {
        let column = Column::new(
            "age",
            ColumnValues::Text(vec![Some("21".into()), None, Some(" 3.5 ".into())]),
        );
        assert_eq!(column.column_type(), ColumnType::Numeric);
        assert_eq!(column.numeric_values(), Some(vec![21.0, 3.5]));
        assert_eq!(column.missing_count(), 1);
    }

    #[test]
    fn test_mixed_text_column_is_categorical() {
        let column = Column::text("city", ["1", "paris", "3"]);
        assert_eq!(column.column_type(), ColumnType::Categorical);
        assert_eq!(column.numeric_values(), None);
        assert_eq!(column.categorical_values(), vec!["1", "paris", "3"]);
    }

    #[test]
    fn test_try_new_rejects_ragged_columns() {
        let result = Dataset::try_new(vec![
            Column::numeric("a", [1.0, 2.0]),
            Column::numeric("b", [1.0]),
        ]);
        assert!(matches!(result, Err(DriftError::Configuration(_))));
    }

    #[test]
    fn test_try_new_rejects_duplicate_names() {
        let result = Dataset::try_new(vec![
            Column::numeric("a", [1.0]),
            Column::numeric("a", [2.0]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::empty();
        assert_eq!(dataset.num_columns(), 0);
        assert_eq!(dataset.num_rows(), 0);
    }

    #[test]
    fn test_from_record_batches() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, true),
            Field::new("city", DataType::Utf8, true),
        ]));
        let first = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(20), None])),
                Arc::new(StringArray::from(vec![Some("oslo"), Some("rome")])),
            ],
        )
        .unwrap();
        let second = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(30)])),
                Arc::new(StringArray::from(vec![None::<&str>])),
            ],
        )
        .unwrap();

        let dataset = Dataset::from_record_batches(&schema, &[first, second]).unwrap();
        assert_eq!(dataset.column_names(), vec!["age", "city"]);
        assert_eq!(dataset.num_rows(), 3);

        let age = dataset.column("age").unwrap();
        assert_eq!(
            age.values(),
            &ColumnValues::Numeric(vec![Some(20.0), None, Some(30.0)])
        );
        let city = dataset.column("city").unwrap();
        assert_eq!(city.column_type(), ColumnType::Categorical);
        assert_eq!(city.missing_count(), 1);
    }

    #[test]
    fn test_empty_text_is_missing() {
        let array: ArrayRef = Arc::new(StringArray::from(vec![Some("30"), Some(""), Some("35")]));
        let column = Column::from_arrow("age", &array).unwrap();
        assert_eq!(column.missing_count(), 1);
        assert_eq!(column.column_type(), ColumnType::Numeric);
        assert_eq!(column.numeric_values(), Some(vec![30.0, 35.0]));
    }

    #[test]
    fn test_from_record_batches_without_rows() {
        let schema = Schema::new(vec![Field::new("age", DataType::Float64, true)]);
        let dataset = Dataset::from_record_batches(&schema, &[]).unwrap();
        assert_eq!(dataset.num_columns(), 1);
        assert_eq!(dataset.num_rows(), 0);
    }
}
