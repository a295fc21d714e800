//! Dataset registry: dataset key → bound dataset and its storage adapter.
//!
//! Owned by the composition root and passed to whatever serves requests.
//! Adapters are built by per-kind factories; the in-memory factory is
//! registered by default and other kinds are plugged in by the embedder.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::{JsonRow, Settings};
use crate::error::Result;
use crate::model::{AdapterKind, Dataset, DatasetDefinition, SchemaError};
use crate::sql::Dialect;
use crate::storage::{ConnectionGate, InMemoryAdapter, StorageError, StoragePort};

/// What a factory gets besides the dataset.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    pub gate: &'a ConnectionGate,
    /// Inline rows per table, if configuration declared any.
    pub rows: &'a BTreeMap<String, Vec<JsonRow>>,
}

/// Builds a storage adapter for one dataset.
pub type AdapterFactory = Arc<
    dyn Fn(Arc<Dataset>, AdapterContext<'_>) -> std::result::Result<Arc<dyn StoragePort>, StorageError>
        + Send
        + Sync,
>;

/// A dataset and the adapter that serves it.
#[derive(Clone)]
pub struct RegisteredDataset {
    pub dataset: Arc<Dataset>,
    pub port: Arc<dyn StoragePort>,
    /// Dialect its queries compile to.
    pub dialect: Dialect,
}

impl std::fmt::Debug for RegisteredDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredDataset")
            .field("dataset", &self.dataset.key())
            .field("adapter", &self.port.kind())
            .field("dialect", &self.dialect)
            .finish()
    }
}

pub struct DatasetRegistry {
    datasets: BTreeMap<String, RegisteredDataset>,
    factories: HashMap<AdapterKind, AdapterFactory>,
    dialect_override: Option<Dialect>,
}

impl std::fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("datasets", &self.datasets)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("dialect_override", &self.dialect_override)
            .finish()
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetRegistry {
    /// An empty registry with the in-memory factory installed.
    pub fn new() -> Self {
        let mut registry = Self {
            datasets: BTreeMap::new(),
            factories: HashMap::new(),
            dialect_override: None,
        };
        registry.register_factory(AdapterKind::InMemory, Arc::new(in_memory_factory));
        registry
    }

    /// Build a registry from configuration, binding every declared dataset.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut registry = Self::new();
        registry.dialect_override = settings.query.dialect;
        for entry in &settings.datasets {
            let definition = entry.resolved_definition()?;
            let gate = settings.storage.gate();
            registry.bind(
                definition,
                AdapterContext {
                    gate: &gate,
                    rows: &entry.rows,
                },
            )?;
        }
        Ok(registry)
    }

    /// Install or replace the factory for an adapter kind.
    pub fn register_factory(&mut self, kind: AdapterKind, factory: AdapterFactory) {
        self.factories.insert(kind, factory);
    }

    /// Compile every dataset to `dialect` instead of its adapter's own.
    pub fn with_dialect_override(mut self, dialect: Dialect) -> Self {
        self.dialect_override = Some(dialect);
        for entry in self.datasets.values_mut() {
            entry.dialect = dialect;
        }
        self
    }

    /// Bind a definition and build its adapter.
    pub fn bind(&mut self, definition: DatasetDefinition, context: AdapterContext<'_>) -> Result<Arc<Dataset>> {
        let dataset = Arc::new(Dataset::bind(definition)?);
        let factory = self
            .factories
            .get(&dataset.adapter())
            .ok_or(SchemaError::UnsupportedAdapterKind(dataset.adapter()))?;
        let port = factory(dataset.clone(), context)?;
        self.insert(dataset.clone(), port)?;
        Ok(dataset)
    }

    /// Register an already-built adapter.
    pub fn insert(&mut self, dataset: Arc<Dataset>, port: Arc<dyn StoragePort>) -> Result<(), SchemaError> {
        let key = dataset.key();
        if self.datasets.contains_key(&key) {
            return Err(SchemaError::DuplicateDataset(key));
        }
        let dialect = self
            .dialect_override
            .unwrap_or_else(|| dataset.adapter().default_dialect());
        tracing::info!(dataset = %key, adapter = %dataset.adapter(), %dialect, "dataset registered");
        self.datasets.insert(
            key,
            RegisteredDataset {
                dataset,
                port,
                dialect,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&RegisteredDataset, SchemaError> {
        self.datasets
            .get(key.trim_matches('/'))
            .ok_or_else(|| SchemaError::DatasetNotFound(key.to_string()))
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredDataset> {
        self.datasets.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Close every adapter. Pending calls fail with `Cancelled`.
    pub fn close_all(&self) {
        for entry in self.datasets.values() {
            entry.port.close();
        }
    }
}

fn in_memory_factory(
    dataset: Arc<Dataset>,
    context: AdapterContext<'_>,
) -> std::result::Result<Arc<dyn StoragePort>, StorageError> {
    let mut adapter = InMemoryAdapter::with_gate(dataset, context.gate.clone());
    for (table, rows) in context.rows {
        adapter.insert_json_rows(table, rows)?;
    }
    Ok(Arc::new(adapter))
}
