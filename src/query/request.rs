//! The canonical, validated query request.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{Dataset, DatasetTable};
use crate::sql::SortDir;

use super::normalize::normalize;
use super::validate::validate;
use super::wire::{QueryRequestWire, DEFAULT_LIMIT};
use super::ValidationError;

/// Membership filter on a Category column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub column: String,
    /// Distinct values in first-seen order.
    pub values: Vec<String>,
}

/// Range filter on a Fact column. At least one bound is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactFilter {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Category(CategoryFilter),
    Fact(FactFilter),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Category(f) => &f.column,
            Filter::Fact(f) => &f.column,
        }
    }
}

/// A projected column; `alias` defaults to the column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    pub column: String,
    pub alias: String,
}

/// Built-in aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationFunction {
    Count,
    Sum,
    Avg,
    Median,
    Min,
    Max,
}

impl AggregationFunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            AggregationFunction::Count => "COUNT",
            AggregationFunction::Sum => "SUM",
            AggregationFunction::Avg => "AVG",
            AggregationFunction::Median => "MEDIAN",
            AggregationFunction::Min => "MIN",
            AggregationFunction::Max => "MAX",
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for AggregationFunction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COUNT" => Ok(AggregationFunction::Count),
            "SUM" => Ok(AggregationFunction::Sum),
            "AVG" => Ok(AggregationFunction::Avg),
            "MEDIAN" => Ok(AggregationFunction::Median),
            "MIN" => Ok(AggregationFunction::Min),
            "MAX" => Ok(AggregationFunction::Max),
            _ => Err(ValidationError::UnknownAggregationFunction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregation {
    Standard {
        column: String,
        function: AggregationFunction,
        alias: String,
    },
    /// Resolved through the dataset's custom aggregation map.
    Custom { function: String, alias: String },
}

impl Aggregation {
    pub fn alias(&self) -> &str {
        match self {
            Aggregation::Standard { alias, .. } | Aggregation::Custom { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDir,
}

/// Validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    limit: u64,
    offset: u64,
}

impl Pagination {
    /// `limit` must be positive; `offset` non-negative.
    pub fn new(limit: i64, offset: i64) -> Result<Self, ValidationError> {
        if limit <= 0 || offset < 0 {
            return Err(ValidationError::InvalidPaginationParameters { limit, offset });
        }
        Ok(Self {
            limit: limit as u64,
            offset: offset as u64,
        })
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT as u64,
            offset: 0,
        }
    }
}

/// A request that has been normalized and checked against its dataset.
///
/// Immutable once built; the only way to obtain one is
/// [`QueryRequest::from_wire`], so holding one means validation passed.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    dataset: Arc<Dataset>,
    table: String,
    filters: Vec<Filter>,
    select: Vec<SelectItem>,
    aggregations: Vec<Aggregation>,
    order_by: Vec<OrderBy>,
    pagination: Pagination,
    breakdown: Option<String>,
    group_by: Vec<String>,
}

impl QueryRequest {
    /// Normalize and validate a wire payload against `dataset`.
    pub fn from_wire(dataset: Arc<Dataset>, wire: QueryRequestWire) -> Result<Self, ValidationError> {
        let normalized = normalize(wire)?;
        let pagination = validate(&dataset, &normalized)?;

        let group_by = derive_group_by(
            &normalized.select,
            &normalized.aggregations,
            &normalized.order_by,
            normalized.breakdown.as_deref(),
        );

        Ok(Self {
            dataset,
            table: normalized.table,
            filters: normalized.filters,
            select: normalized.select,
            aggregations: normalized.aggregations,
            order_by: normalized.order_by,
            pagination,
            breakdown: normalized.breakdown,
            group_by,
        })
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// The target table. Present by construction.
    pub fn table(&self) -> Option<&DatasetTable> {
        self.dataset.table(&self.table)
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn select(&self) -> &[SelectItem] {
        &self.select
    }

    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn breakdown(&self) -> Option<&str> {
        self.breakdown.as_deref()
    }

    /// Select aliases, then order-by columns, then the breakdown column,
    /// exact duplicates dropped, first occurrence kept. Ordering on an
    /// aggregation alias does not group by it.
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }
}

fn derive_group_by(
    select: &[SelectItem],
    aggregations: &[Aggregation],
    order_by: &[OrderBy],
    breakdown: Option<&str>,
) -> Vec<String> {
    let mut group_by: Vec<String> = Vec::new();
    let is_aggregate = |name: &str| aggregations.iter().any(|a| a.alias() == name);
    let candidates = select
        .iter()
        .map(|s| s.alias.as_str())
        .chain(
            order_by
                .iter()
                .map(|o| o.column.as_str())
                .filter(|name| !is_aggregate(name)),
        )
        .chain(breakdown);

    for name in candidates {
        if !group_by.iter().any(|g| g == name) {
            group_by.push(name.to_string());
        }
    }
    group_by
}
