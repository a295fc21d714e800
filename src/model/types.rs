//! Column and adapter enumerations shared across the schema model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SchemaError;
use crate::sql::Dialect;

/// What role a column plays in a query.
///
/// Orthogonal to [`ColumnDataType`]: classification decides which filters and
/// aggregations are legal on the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnClassification {
    /// Discrete values: membership filters and enumeration.
    Category,
    DateTime,
    /// Numeric values: range filters and aggregation.
    Fact,
    Other,
}

impl ColumnClassification {
    pub const ALL: [ColumnClassification; 4] = [
        ColumnClassification::Category,
        ColumnClassification::DateTime,
        ColumnClassification::Fact,
        ColumnClassification::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnClassification::Category => "Category",
            ColumnClassification::DateTime => "DateTime",
            ColumnClassification::Fact => "Fact",
            ColumnClassification::Other => "Other",
        }
    }
}

impl fmt::Display for ColumnClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnClassification {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Category" => Ok(ColumnClassification::Category),
            "DateTime" => Ok(ColumnClassification::DateTime),
            "Fact" => Ok(ColumnClassification::Fact),
            "Other" => Ok(ColumnClassification::Other),
            other => Err(SchemaError::UnknownClassification(other.to_string())),
        }
    }
}

/// Physical value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnDataType {
    String,
    Number,
    Boolean,
    DateTime,
}

impl fmt::Display for ColumnDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnDataType::String => "String",
            ColumnDataType::Number => "Number",
            ColumnDataType::Boolean => "Boolean",
            ColumnDataType::DateTime => "DateTime",
        };
        f.write_str(s)
    }
}

/// Which storage adapter serves a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKind {
    InMemory,
    #[serde(rename = "PostgreSQL", alias = "Postgres")]
    PostgreSql,
    Snowflake,
    Custom,
}

impl AdapterKind {
    /// The SQL dialect queries for this adapter compile to unless overridden.
    pub fn default_dialect(&self) -> Dialect {
        match self {
            AdapterKind::Snowflake => Dialect::Snowflake,
            AdapterKind::PostgreSql | AdapterKind::InMemory | AdapterKind::Custom => {
                Dialect::Postgres
            }
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterKind::InMemory => "InMemory",
            AdapterKind::PostgreSql => "PostgreSQL",
            AdapterKind::Snowflake => "Snowflake",
            AdapterKind::Custom => "Custom",
        };
        f.write_str(s)
    }
}

/// A single value in a dataset's opaque adapter configuration bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdapterConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AdapterConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterConfigValue::Bool(b) => write!(f, "{}", b),
            AdapterConfigValue::Int(n) => write!(f, "{}", n),
            AdapterConfigValue::Float(x) => write!(f, "{}", x),
            AdapterConfigValue::Text(s) => f.write_str(s),
        }
    }
}
