//! Wire shapes -> canonical request parts.
//!
//! Purely structural: nothing here looks at the dataset. Only malformed
//! tokens (an unknown function name or sort direction, a fact filter with
//! no bounds) are rejected at this stage.

use std::collections::HashSet;

use crate::sql::SortDir;

use super::request::{Aggregation, CategoryFilter, FactFilter, Filter, OrderBy, SelectItem};
use super::wire::{
    AggregationWire, FilterWire, OrderByWire, PaginationWire, QueryRequestWire, SelectWire,
    DEFAULT_LIMIT,
};
use super::ValidationError;

/// A request in canonical shape that has not yet met its dataset.
///
/// Pagination stays signed so validation can report out-of-range values.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub table: String,
    pub filters: Vec<Filter>,
    pub select: Vec<SelectItem>,
    pub aggregations: Vec<Aggregation>,
    pub order_by: Vec<OrderBy>,
    pub limit: i64,
    pub offset: i64,
    pub breakdown: Option<String>,
}

/// Fold every accepted wire shape into the one canonical form.
pub fn normalize(wire: QueryRequestWire) -> Result<NormalizedRequest, ValidationError> {
    let filters = wire
        .filters
        .into_iter()
        .map(normalize_filter)
        .collect::<Result<Vec<_>, _>>()?;

    let select = wire.select.into_iter().map(normalize_select).collect();

    let aggregations = wire
        .aggregations
        .into_iter()
        .map(normalize_aggregation)
        .collect::<Result<Vec<_>, _>>()?;

    let order_by = wire
        .order_by
        .into_iter()
        .map(normalize_order_by)
        .collect::<Result<Vec<_>, _>>()?;

    let (limit, offset) = match wire.pagination {
        None => (DEFAULT_LIMIT, 0),
        Some(PaginationWire::Pair(offset, limit)) => (limit, offset),
        Some(PaginationWire::Object { limit, offset }) => (limit, offset),
    };

    Ok(NormalizedRequest {
        table: wire.table_name,
        filters,
        select,
        aggregations,
        order_by,
        limit,
        offset,
        breakdown: wire.breakdown,
    })
}

pub fn normalize_select(item: SelectWire) -> SelectItem {
    match item {
        SelectWire::Name(column) => SelectItem {
            alias: column.clone(),
            column,
        },
        SelectWire::Pair(column, alias) => SelectItem { column, alias },
        SelectWire::Object { column_name, alias } => SelectItem {
            alias: alias.unwrap_or_else(|| column_name.clone()),
            column: column_name,
        },
    }
}

pub fn normalize_aggregation(item: AggregationWire) -> Result<Aggregation, ValidationError> {
    let (column, function, alias) = match item {
        AggregationWire::Pair(function, alias)
        | AggregationWire::Custom {
            function_name: function,
            alias,
        } => return Ok(Aggregation::Custom { function, alias }),
        AggregationWire::Triple(column, function, alias) => (column, function, alias),
        AggregationWire::Standard {
            column_name,
            function,
            alias,
        } => (column_name, function, alias),
    };

    Ok(Aggregation::Standard {
        column,
        function: function.parse()?,
        alias,
    })
}

pub fn normalize_order_by(item: OrderByWire) -> Result<OrderBy, ValidationError> {
    let (column, direction) = match item {
        OrderByWire::Pair(column, direction) => (column, Some(direction)),
        OrderByWire::Object {
            column_name,
            direction,
        } => (column_name, direction),
    };

    let direction = match direction {
        None => SortDir::default(),
        Some(d) => d
            .parse::<SortDir>()
            .map_err(ValidationError::UnknownSortDirection)?,
    };

    Ok(OrderBy { column, direction })
}

pub fn normalize_filter(item: FilterWire) -> Result<Filter, ValidationError> {
    match item {
        FilterWire::Category {
            column_name,
            values,
        } => {
            let mut seen = HashSet::with_capacity(values.len());
            let distinct: Vec<String> = values
                .into_iter()
                .filter(|v| seen.insert(v.clone()))
                .collect();
            Ok(Filter::Category(CategoryFilter {
                column: column_name,
                values: distinct,
            }))
        }
        FilterWire::Fact {
            column_name,
            min,
            max,
            values,
        } => {
            let (legacy_min, legacy_max) = values.unwrap_or((None, None));
            let min = min.or(legacy_min);
            let max = max.or(legacy_max);
            if min.is_none() && max.is_none() {
                return Err(ValidationError::FactFilterWithoutBounds(column_name));
            }
            Ok(Filter::Fact(FactFilter {
                column: column_name,
                min,
                max,
            }))
        }
    }
}
