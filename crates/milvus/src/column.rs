//! Column-oriented data.
//!
//! Inserts and search results both travel as named, typed columns of equal
//! length. Row `i` of a batch is the `i`-th value of every column.

use crate::types::DataType;
use sectiondb_core::{AppError, AppResult};
use serde_json::Value;

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64 {
        name: String,
        values: Vec<i64>,
    },
    VarChar {
        name: String,
        values: Vec<String>,
    },
    FloatVector {
        name: String,
        dim: usize,
        values: Vec<Vec<f32>>,
    },
}

impl Column {
    pub fn int64(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::Int64 {
            name: name.into(),
            values,
        }
    }

    pub fn varchar(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::VarChar {
            name: name.into(),
            values,
        }
    }

    /// Build a vector column, rejecting any vector whose length is not `dim`.
    pub fn float_vector(
        name: impl Into<String>,
        dim: usize,
        values: Vec<Vec<f32>>,
    ) -> AppResult<Self> {
        let name = name.into();
        if let Some((row, v)) = values.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(AppError::InvalidInput(format!(
                "Column '{}' row {}: vector has dimension {}, expected {}",
                name,
                row,
                v.len(),
                dim
            )));
        }
        Ok(Self::FloatVector { name, dim, values })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Int64 { name, .. }
            | Self::VarChar { name, .. }
            | Self::FloatVector { name, .. } => name,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int64 { .. } => DataType::Int64,
            Self::VarChar { .. } => DataType::VarChar,
            Self::FloatVector { .. } => DataType::FloatVector,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int64 { values, .. } => values.len(),
            Self::VarChar { values, .. } => values.len(),
            Self::FloatVector { values, .. } => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Int64 value at `idx`.
    pub fn int64_at(&self, idx: usize) -> AppResult<i64> {
        match self {
            Self::Int64 { values, .. } => values
                .get(idx)
                .copied()
                .ok_or_else(|| self.out_of_range(idx)),
            _ => Err(self.type_mismatch(DataType::Int64)),
        }
    }

    /// VarChar value at `idx`.
    pub fn varchar_at(&self, idx: usize) -> AppResult<&str> {
        match self {
            Self::VarChar { values, .. } => values
                .get(idx)
                .map(String::as_str)
                .ok_or_else(|| self.out_of_range(idx)),
            _ => Err(self.type_mismatch(DataType::VarChar)),
        }
    }

    /// JSON value of row `idx`, as sent in row-based REST payloads.
    pub(crate) fn json_at(&self, idx: usize) -> AppResult<Value> {
        match self {
            Self::Int64 { values, .. } => values
                .get(idx)
                .map(|v| Value::from(*v))
                .ok_or_else(|| self.out_of_range(idx)),
            Self::VarChar { values, .. } => values
                .get(idx)
                .map(|v| Value::from(v.as_str()))
                .ok_or_else(|| self.out_of_range(idx)),
            Self::FloatVector { values, .. } => values
                .get(idx)
                .map(|v| Value::from(v.clone()))
                .ok_or_else(|| self.out_of_range(idx)),
        }
    }

    fn out_of_range(&self, idx: usize) -> AppError {
        AppError::Schema(format!(
            "Index {} out of range for column '{}' of length {}",
            idx,
            self.name(),
            self.len()
        ))
    }

    fn type_mismatch(&self, expected: DataType) -> AppError {
        AppError::Schema(format!(
            "Column '{}' is {}, expected {}",
            self.name(),
            self.data_type().as_str(),
            expected.as_str()
        ))
    }
}

/// Check that every column has the same number of rows and return it.
pub fn row_count(columns: &[Column]) -> AppResult<usize> {
    let Some(first) = columns.first() else {
        return Ok(0);
    };

    let rows = first.len();
    for column in columns {
        if column.len() != rows {
            return Err(AppError::InvalidInput(format!(
                "Column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                rows
            )));
        }
    }

    Ok(rows)
}
