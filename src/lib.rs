//! # AnySet
//!
//! A declarative query surface over tabular datasets held in pluggable
//! backends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Wire request (JSON, loosely shaped)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query::normalize]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Canonical request, checked against the Dataset      │
//! │      (model: tables, columns, classifications)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Parameterized SQL + bound parameters           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [storage::StoragePort]
//! ┌─────────────────────────────────────────────────────────┐
//! │                       ResultSet                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Filter options take a parallel path: `StoragePort::fetch_raw_filter_data`
//! feeds [`filter_options`], which enumerates categories, fact ranges and
//! hierarchy trees.

pub mod compile;
pub mod config;
pub mod error;
pub mod filter_options;
pub mod logging;
pub mod model;
pub mod query;
pub mod registry;
pub mod service;
pub mod sql;
pub mod storage;

pub use error::{Error, ErrorKind, Result};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{compile_query, CompileOptions, CompiledQuery};
    pub use crate::filter_options::{FilterOption, FilterOptionValue, HierarchyNode};
    pub use crate::model::{
        AdapterKind, ColumnClassification, ColumnDataType, Dataset, DatasetDefinition,
    };
    pub use crate::query::{QueryRequest, QueryRequestWire};
    pub use crate::registry::DatasetRegistry;
    pub use crate::service::QueryService;
    pub use crate::sql::{BoundParams, Dialect, ParamValue};
    pub use crate::storage::{ResultSet, StoragePort};
    pub use crate::{Error, ErrorKind};
}
