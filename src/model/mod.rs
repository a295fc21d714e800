//! Dataset schema model.
//!
//! A [`DatasetDefinition`] is what configuration declares; [`Dataset::bind`]
//! validates it once and produces the immutable [`Dataset`] every request is
//! checked against.

mod dataset;
mod error;
mod hierarchy;
mod table;
mod types;

pub use dataset::{Dataset, DatasetDefinition};
pub use error::{HierarchyColumnFault, SchemaError};
pub use hierarchy::{CategoryHierarchy, HierarchyLevel};
pub use table::{ColumnDefinition, DatasetTable, DatasetTableColumn, TableDefinition};
pub use types::{AdapterConfigValue, AdapterKind, ColumnClassification, ColumnDataType};
