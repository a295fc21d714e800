//! The query request model.
//!
//! A request travels `wire -> normalize -> validate` and comes out as an
//! immutable [`QueryRequest`] bound to its [`Dataset`](crate::model::Dataset).

mod error;
pub mod normalize;
mod request;
mod validate;
pub mod wire;

pub use error::ValidationError;
pub use normalize::{normalize, NormalizedRequest};
pub use request::{
    Aggregation, AggregationFunction, CategoryFilter, FactFilter, Filter, OrderBy, Pagination,
    QueryRequest, SelectItem,
};
pub use validate::validate;
pub use wire::{
    AggregationWire, FilterWire, OrderByWire, PaginationWire, QueryRequestWire, SelectWire,
};
