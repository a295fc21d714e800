//! Schema-aware checks, run in a fixed order and failing on the first
//! violation. Later checks assume earlier ones passed.

use crate::model::{ColumnClassification, Dataset};

use super::normalize::NormalizedRequest;
use super::request::{Aggregation, Filter, Pagination};
use super::ValidationError;

/// Check `request` against `dataset`, returning the validated pagination.
///
/// Order-by columns are not checked; ordering on any name, including an
/// aggregation alias, is allowed.
pub fn validate(
    dataset: &Dataset,
    request: &NormalizedRequest,
) -> Result<Pagination, ValidationError> {
    let table = dataset
        .table(&request.table)
        .ok_or_else(|| ValidationError::TableNotFound(request.table.clone()))?;

    for filter in &request.filters {
        check_filter(dataset, table.name(), filter)?;
    }

    for item in &request.select {
        if !table.has_column(&item.column) {
            return Err(ValidationError::SelectColumnNotFound {
                table: table.name().to_string(),
                column: item.column.clone(),
            });
        }
    }

    for aggregation in &request.aggregations {
        check_aggregation(dataset, table.name(), aggregation)?;
    }

    Pagination::new(request.limit, request.offset)
}

/// A missing column counts as not classified.
fn classified_as(dataset: &Dataset, table: &str, column: &str, classification: ColumnClassification) -> bool {
    dataset
        .is_column_classified_as(column, classification, table)
        .unwrap_or(false)
}

fn check_filter(dataset: &Dataset, table: &str, filter: &Filter) -> Result<(), ValidationError> {
    let expected = match filter {
        Filter::Category(_) => ColumnClassification::Category,
        Filter::Fact(_) => ColumnClassification::Fact,
    };
    if classified_as(dataset, table, filter.column(), expected) {
        Ok(())
    } else {
        Err(ValidationError::FilterColumnInvalid {
            column: filter.column().to_string(),
            expected,
        })
    }
}

fn check_aggregation(
    dataset: &Dataset,
    table: &str,
    aggregation: &Aggregation,
) -> Result<(), ValidationError> {
    match aggregation {
        Aggregation::Standard { column, .. } => {
            if !classified_as(dataset, table, column, ColumnClassification::Fact) {
                return Err(ValidationError::AggregationColumnNotFound(column.clone()));
            }
        }
        Aggregation::Custom { function, .. } => {
            if dataset.custom_aggregation(function).is_none() {
                return Err(ValidationError::CustomAggregationFunctionNotFound(
                    function.clone(),
                ));
            }
        }
    }
    Ok(())
}
