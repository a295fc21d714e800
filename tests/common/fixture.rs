//! Shared dataset fixture for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use anyset::model::{Dataset, DatasetDefinition};
use anyset::query::{QueryRequest, QueryRequestWire, ValidationError};
use anyset::storage::InMemoryAdapter;
use serde_json::json;

/// Table `t`:
/// `cat` Category, `fct` Fact, `region` Category, `city` Category (parent
/// `region`), `day` DateTime, `note` Other. Hierarchy `geo` = region → city.
pub fn sales_definition() -> DatasetDefinition {
    serde_json::from_value(json!({
        "name": "Sales Data",
        "path_prefix": "sales",
        "version": 1,
        "adapter": "InMemory",
        "tables": [{
            "name": "t",
            "columns": [
                {"name": "cat", "classification": "Category", "data_type": "String"},
                {"name": "fct", "classification": "Fact", "data_type": "Number"},
                {"name": "region", "classification": "Category", "data_type": "String"},
                {"name": "city", "classification": "Category", "data_type": "String", "parent": "region"},
                {"name": "day", "classification": "DateTime", "data_type": "DateTime"},
                {"name": "note", "classification": "Other", "data_type": "String"}
            ]
        }],
        "custom_aggregation_functions": {"ratio": "SUM(fct) / COUNT(*)"},
        "category_hierarchies": [{
            "name": "geo",
            "levels": [{"table": "t", "column": "region"}, {"table": "t", "column": "city"}]
        }]
    }))
    .unwrap()
}

pub fn sales_dataset() -> Arc<Dataset> {
    Arc::new(Dataset::bind(sales_definition()).unwrap())
}

pub fn wire(body: serde_json::Value) -> QueryRequestWire {
    serde_json::from_value(body).unwrap()
}

pub fn request(body: serde_json::Value) -> Result<QueryRequest, ValidationError> {
    QueryRequest::from_wire(sales_dataset(), wire(body))
}

pub fn sales_rows() -> Vec<serde_json::Map<String, serde_json::Value>> {
    let rows = json!([
        {"cat": "a", "fct": 10, "region": "US", "city": "NY", "day": "2024-01-01T00:00:00Z"},
        {"cat": "b", "fct": 5, "region": "US", "city": "LA", "day": "2024-01-02T00:00:00Z"},
        {"cat": "a", "fct": 2.5, "region": "EU", "city": "Paris", "day": "2024-01-03T00:00:00Z"},
        {"cat": "c", "fct": null, "region": "US", "city": "NY", "note": "late"},
        {"cat": "b", "fct": 7, "region": "EU", "city": "Paris"}
    ]);
    serde_json::from_value(rows).unwrap()
}

pub fn loaded_adapter(dataset: Arc<Dataset>) -> InMemoryAdapter {
    let mut adapter = InMemoryAdapter::new(dataset);
    adapter.insert_json_rows("t", &sales_rows()).unwrap();
    adapter
}
