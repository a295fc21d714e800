use crate::model::ColumnClassification;

/// A request rejected before it reaches the compiler.
///
/// Always caller-caused; never retried and never sent to a backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("filter column '{column}' is not a {expected} column")]
    FilterColumnInvalid {
        column: String,
        expected: ColumnClassification,
    },

    #[error("select column '{column}' not found in table '{table}'")]
    SelectColumnNotFound { table: String, column: String },

    #[error("aggregation column '{0}' is not a Fact column")]
    AggregationColumnNotFound(String),

    #[error("custom aggregation function not found: {0}")]
    CustomAggregationFunctionNotFound(String),

    #[error("invalid pagination: limit={limit}, offset={offset}")]
    InvalidPaginationParameters { limit: i64, offset: i64 },

    #[error("unknown aggregation function: {0}")]
    UnknownAggregationFunction(String),

    #[error("unknown sort direction: {0}")]
    UnknownSortDirection(String),

    #[error("fact filter on '{0}' has neither min nor max")]
    FactFilterWithoutBounds(String),
}
