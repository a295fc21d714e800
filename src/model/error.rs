use super::{AdapterKind, ColumnClassification};

/// Errors raised while binding or querying the schema model.
///
/// These are configuration faults, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("unknown column classification: {0}")]
    UnknownClassification(String),

    #[error("duplicate table: {0}")]
    DuplicateTable(String),

    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("column '{column}' in table '{table}' references unknown parent '{parent}'")]
    UnknownParentColumn {
        table: String,
        column: String,
        parent: String,
    },

    #[error("hierarchy '{0}' has no levels")]
    EmptyHierarchy(String),

    #[error("hierarchy '{hierarchy}' level {table}.{column} is invalid: {reason}")]
    InvalidHierarchyColumn {
        hierarchy: String,
        table: String,
        column: String,
        reason: HierarchyColumnFault,
    },

    #[error("no storage adapter registered for kind {0}")]
    UnsupportedAdapterKind(AdapterKind),

    #[error("dataset already registered: {0}")]
    DuplicateDataset(String),

    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
}

/// Why a hierarchy level was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyColumnFault {
    #[error("table does not exist")]
    MissingTable,
    #[error("column does not exist")]
    MissingColumn,
    #[error("column is classified {0}, expected Category")]
    NotCategory(ColumnClassification),
    #[error("level is not in table '{0}' like the first level")]
    TableMismatch(String),
}
