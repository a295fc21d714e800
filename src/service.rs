//! Request entry points over a [`DatasetRegistry`].
//!
//! Validation and compilation run synchronously before any I/O; only the
//! storage call is awaited. Logs carry the dataset, table and parameter
//! count, never parameter values.

use std::sync::Arc;

use serde::Serialize;

use crate::compile::{compile_query, CompileOptions, CompiledQuery};
use crate::error::Result;
use crate::filter_options::{collect_filter_options, FilterOption};
use crate::query::{QueryRequest, QueryRequestWire};
use crate::registry::DatasetRegistry;
use crate::storage::ResultSet;

/// Summary of one registered dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub key: String,
    pub id: String,
    pub name: String,
    pub version: u32,
    pub adapter: String,
    pub dialect: String,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QueryService {
    registry: Arc<DatasetRegistry>,
}

impl QueryService {
    pub fn new(registry: Arc<DatasetRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Normalize and validate a wire request against the dataset at `key`.
    pub fn validate(&self, key: &str, wire: QueryRequestWire) -> Result<QueryRequest> {
        let entry = self.registry.get(key)?;
        QueryRequest::from_wire(entry.dataset.clone(), wire).map_err(|err| {
            tracing::debug!(dataset = key, error = %err, "request rejected");
            err.into()
        })
    }

    /// Validate and compile without touching the backend.
    pub fn compile(&self, key: &str, wire: QueryRequestWire) -> Result<CompiledQuery> {
        let entry = self.registry.get(key)?;
        let request = self.validate(key, wire)?;
        let compiled = compile_query(&request, CompileOptions::default().with_dialect(entry.dialect))?;
        tracing::debug!(
            dataset = %compiled.dataset_key,
            table = request.table_name(),
            dialect = %compiled.dialect,
            param_count = compiled.params.len(),
            "query compiled"
        );
        Ok(compiled)
    }

    /// Validate, compile and execute.
    pub async fn execute(&self, key: &str, wire: QueryRequestWire) -> Result<ResultSet> {
        let compiled = self.compile(key, wire)?;
        let entry = self.registry.get(key)?;

        match entry.port.execute_query(&compiled).await {
            Ok(result) => {
                tracing::info!(
                    dataset = %compiled.dataset_key,
                    table = compiled.request.table_name(),
                    rows = result.rows(),
                    "query executed"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::error!(
                    dataset = %compiled.dataset_key,
                    table = compiled.request.table_name(),
                    param_count = compiled.params.len(),
                    error = %err,
                    "query failed"
                );
                Err(err.into())
            }
        }
    }

    /// Derive filter options for the dataset at `key`.
    pub async fn filter_options(&self, key: &str) -> Result<Vec<FilterOption>> {
        let entry = self.registry.get(key)?;
        Ok(collect_filter_options(&entry.dataset, entry.port.as_ref()).await?)
    }

    /// Every registered dataset, sorted by key.
    pub fn list(&self) -> Vec<DatasetSummary> {
        self.registry
            .iter()
            .map(|entry| {
                let dataset = &entry.dataset;
                DatasetSummary {
                    key: dataset.key(),
                    id: dataset.id(),
                    name: dataset.name().to_string(),
                    version: dataset.version(),
                    adapter: dataset.adapter().to_string(),
                    dialect: entry.dialect.to_string(),
                    tables: dataset.tables().iter().map(|t| t.name().to_string()).collect(),
                }
            })
            .collect()
    }
}
