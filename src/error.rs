//! Crate-level error type.
//!
//! Each layer keeps its own error enum; [`Error`] gathers them for callers
//! that cross layers, and [`ErrorKind`] makes the category discoverable so a
//! transport layer can map it to a status without matching every variant.

use crate::compile::CompileError;
use crate::config::SettingsError;
use crate::filter_options::FilterOptionsError;
use crate::model::SchemaError;
use crate::query::ValidationError;
use crate::storage::StorageError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    FilterOptions(#[from] FilterOptionsError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Coarse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown table, column or classification in the schema model.
    Schema,
    /// Dataset key not registered.
    NotFound,
    /// Malformed or schema-violating request.
    Validation,
    /// A validated request failed to compile. Always a bug.
    CompilationInvariant,
    /// The backend failed the call.
    Backend,
    PoolExhausted,
    Cancelled,
    UnsupportedAdapterKind,
    Configuration,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Schema(e) => schema_kind(e),
            Error::Validation(_) => ErrorKind::Validation,
            Error::Compile(_) => ErrorKind::CompilationInvariant,
            Error::Storage(e) => storage_kind(e),
            Error::FilterOptions(FilterOptionsError::Storage(e)) => storage_kind(e),
            Error::FilterOptions(FilterOptionsError::Schema(e)) => schema_kind(e),
            Error::FilterOptions(_) => ErrorKind::Backend,
            Error::Settings(_) => ErrorKind::Configuration,
        }
    }

    /// Only adapter-layer capacity failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Storage(e) | Error::FilterOptions(FilterOptionsError::Storage(e)) => e.is_retryable(),
            _ => false,
        }
    }
}

fn schema_kind(err: &SchemaError) -> ErrorKind {
    match err {
        SchemaError::UnsupportedAdapterKind(_) => ErrorKind::UnsupportedAdapterKind,
        SchemaError::DatasetNotFound(_) => ErrorKind::NotFound,
        _ => ErrorKind::Schema,
    }
}

fn storage_kind(err: &StorageError) -> ErrorKind {
    match err {
        StorageError::PoolExhausted { .. } => ErrorKind::PoolExhausted,
        StorageError::Cancelled => ErrorKind::Cancelled,
        _ => ErrorKind::Backend,
    }
}
