//! Loosely-typed request payloads as they arrive over the wire.
//!
//! Each list entry accepts several historical shapes; [`super::normalize`]
//! folds them into the canonical request model.

use serde::{Deserialize, Serialize};

/// Top-level request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequestWire {
    pub table_name: String,
    #[serde(default)]
    pub filters: Vec<FilterWire>,
    #[serde(default)]
    pub select: Vec<SelectWire>,
    #[serde(default)]
    pub aggregations: Vec<AggregationWire>,
    #[serde(default)]
    pub order_by: Vec<OrderByWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<String>,
}

/// A filter, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterWire {
    #[serde(alias = "QueryRequestFilterCategory")]
    Category {
        column_name: String,
        #[serde(default)]
        values: Vec<String>,
    },
    #[serde(alias = "QueryRequestFilterFact")]
    Fact {
        column_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Legacy `[min, max]` pair, either side nullable.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        values: Option<(Option<f64>, Option<f64>)>,
    },
}

/// `"col"`, `["col", "alias"]` or `{column_name, alias?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectWire {
    Name(String),
    Pair(String, String),
    Object {
        column_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
}

/// `[col, function, alias]`, `[function_name, alias]`, or the object forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregationWire {
    Triple(String, String, String),
    Pair(String, String),
    Standard {
        column_name: String,
        #[serde(alias = "aggregation_function")]
        function: String,
        alias: String,
    },
    Custom {
        function_name: String,
        alias: String,
    },
}

/// `["col", "DESC"]` or `{column_name, direction?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderByWire {
    Pair(String, String),
    Object {
        column_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
    },
}

/// `[offset, limit]` or `{limit?, offset?}`.
///
/// Signed on purpose: a negative offset must reach validation and be
/// reported, not fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaginationWire {
    Pair(i64, i64),
    Object {
        #[serde(default = "default_limit")]
        limit: i64,
        #[serde(default)]
        offset: i64,
    },
}

pub const DEFAULT_LIMIT: i64 = 100;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}
