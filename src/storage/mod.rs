//! The storage port: the one boundary where a query touches a backend.
//!
//! The schema model, validator and compiler are synchronous and pure. A
//! [`StoragePort`] call is the only suspension point. Dropping its future
//! abandons the call; adapters whose driver supports abort should honor it.

mod error;
mod memory;
mod pool;
mod result;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::compile::CompiledQuery;
use crate::model::AdapterKind;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryAdapter;
pub use pool::{ConnectionGate, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONCURRENCY};
pub use result::{CellValue, ColumnData, ResultColumn, ResultSet};

pub(crate) use result::format_number;

/// A column to fetch for filter-option derivation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// One row of raw values, aligned with the requested [`ColumnRef`]s.
pub type RawRow = Vec<CellValue>;

/// Stream of raw rows for filter-option derivation.
pub type RawRowStream = BoxStream<'static, StorageResult<RawRow>>;

/// Contract every backend adapter satisfies.
///
/// Adapters own connection acquisition and pooling; callers only see the
/// two operations and their errors.
#[async_trait]
pub trait StoragePort: Send + Sync {
    /// The adapter kind this port serves.
    fn kind(&self) -> AdapterKind;

    /// Execute a compiled query.
    ///
    /// All-or-nothing: on error no partial rows are returned.
    async fn execute_query(&self, query: &CompiledQuery) -> StorageResult<ResultSet>;

    /// Stream the values of `columns`, one row per source row.
    ///
    /// All refs name the same table.
    async fn fetch_raw_filter_data(&self, columns: &[ColumnRef]) -> StorageResult<RawRowStream>;

    /// Stop accepting calls. Pending acquisitions fail with
    /// [`StorageError::Cancelled`].
    fn close(&self) {}
}
