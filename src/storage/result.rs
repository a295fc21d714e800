//! Backend-agnostic result values.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ColumnDataType;

use super::{StorageError, StorageResult};

/// A single value read from a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Number(f64),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    /// Read a JSON value as a cell of the declared data type.
    pub fn from_json(value: &serde_json::Value, data_type: ColumnDataType) -> StorageResult<Self> {
        use serde_json::Value;

        let cell = match (data_type, value) {
            (_, Value::Null) => CellValue::Null,
            (ColumnDataType::String, Value::String(s)) => CellValue::Text(s.clone()),
            (ColumnDataType::String, Value::Number(n)) => CellValue::Text(n.to_string()),
            (ColumnDataType::String, Value::Bool(b)) => CellValue::Text(b.to_string()),
            (ColumnDataType::Number, Value::Number(n)) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => return Err(mismatch(value, data_type)),
            },
            (ColumnDataType::Number, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) => CellValue::Number(f),
                Err(_) => return Err(mismatch(value, data_type)),
            },
            (ColumnDataType::Boolean, Value::Bool(b)) => CellValue::Boolean(*b),
            (ColumnDataType::DateTime, Value::String(s)) => match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => CellValue::DateTime(dt.with_timezone(&Utc)),
                Err(_) => return Err(mismatch(value, data_type)),
            },
            _ => return Err(mismatch(value, data_type)),
        };
        Ok(cell)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display form used for filter labels and category matching.
    ///
    /// Integral numbers print without a fractional part.
    pub fn to_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Boolean(b) => Some(b.to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::DateTime(dt) => Some(dt.to_rfc3339()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }

    /// Total order for sorting. Nulls sort after every value; values of
    /// different kinds compare equal.
    pub fn sort_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => Ordering::Equal,
            (CellValue::Null, _) => Ordering::Greater,
            (_, CellValue::Null) => Ordering::Less,
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        ryu::Buffer::new().format(n).to_string()
    }
}

fn mismatch(value: &serde_json::Value, data_type: ColumnDataType) -> StorageError {
    StorageError::MalformedResult(format!("value {} is not a valid {:?}", value, data_type))
}

/// One typed, nullable data array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnData {
    String(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
    Boolean(Vec<Option<bool>>),
    DateTime(Vec<Option<DateTime<Utc>>>),
}

impl ColumnData {
    /// Collect cells into an array of `data_type`.
    pub fn from_cells(data_type: ColumnDataType, cells: Vec<CellValue>) -> StorageResult<Self> {
        fn collect<T>(
            cells: Vec<CellValue>,
            data_type: ColumnDataType,
            pick: impl Fn(CellValue) -> Option<T>,
        ) -> StorageResult<Vec<Option<T>>> {
            cells
                .into_iter()
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    other => {
                        let shown = format!("{:?}", other);
                        pick(other).map(Some).ok_or_else(|| {
                            StorageError::MalformedResult(format!(
                                "cell {} is not a valid {:?}",
                                shown, data_type
                            ))
                        })
                    }
                })
                .collect()
        }

        Ok(match data_type {
            ColumnDataType::String => ColumnData::String(collect(cells, data_type, |c| match c {
                CellValue::Text(s) => Some(s),
                _ => None,
            })?),
            ColumnDataType::Number => ColumnData::Number(collect(cells, data_type, |c| c.as_f64())?),
            ColumnDataType::Boolean => ColumnData::Boolean(collect(cells, data_type, |c| match c {
                CellValue::Boolean(b) => Some(b),
                _ => None,
            })?),
            ColumnDataType::DateTime => ColumnData::DateTime(collect(cells, data_type, |c| match c {
                CellValue::DateTime(dt) => Some(dt),
                _ => None,
            })?),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::String(v) => v.len(),
            ColumnData::Number(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<String>,
    pub data: ColumnData,
}

/// Rows returned for one query, stored column-wise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    dataset: String,
    version: u32,
    rows: usize,
    columns: Vec<ResultColumn>,
}

impl ResultSet {
    /// Every column must hold the same number of values.
    pub fn new(dataset: impl Into<String>, version: u32, columns: Vec<ResultColumn>) -> StorageResult<Self> {
        let rows = columns.first().map_or(0, |c| c.data.len());
        if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(StorageError::MalformedResult(format!(
                "column '{}' has {} values, expected {}",
                bad.alias,
                bad.data.len(),
                rows
            )));
        }
        Ok(Self {
            dataset: dataset.into(),
            version,
            rows,
            columns,
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn column(&self, alias: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.alias == alias)
    }
}
