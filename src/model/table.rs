//! Tables and columns as declared in a dataset definition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ColumnClassification, ColumnDataType, SchemaError};

/// A column as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub classification: ColumnClassification,
    pub data_type: ColumnDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Column one level up in a drill-down chain, within the same table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A table as written in configuration. Column order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<ColumnDefinition>,
}

/// A bound, immutable column.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTableColumn {
    name: String,
    classification: ColumnClassification,
    data_type: ColumnDataType,
    description: Option<String>,
    parent: Option<String>,
}

impl DatasetTableColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classification(&self) -> ColumnClassification {
        self.classification
    }

    pub fn data_type(&self) -> ColumnDataType {
        self.data_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

/// A bound table: columns in declaration order with a by-name index.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetTable {
    name: String,
    description: Option<String>,
    columns: Vec<DatasetTableColumn>,
    column_index: HashMap<String, usize>,
}

impl DatasetTable {
    /// Bind a table definition, rejecting duplicate columns and dangling
    /// parent references.
    pub(crate) fn bind(def: TableDefinition) -> Result<Self, SchemaError> {
        let mut columns = Vec::with_capacity(def.columns.len());
        let mut column_index = HashMap::with_capacity(def.columns.len());

        for col in def.columns {
            if column_index.contains_key(&col.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: def.name,
                    column: col.name,
                });
            }
            column_index.insert(col.name.clone(), columns.len());
            columns.push(DatasetTableColumn {
                name: col.name,
                classification: col.classification,
                data_type: col.data_type,
                description: col.description,
                parent: col.parent,
            });
        }

        for col in &columns {
            if let Some(parent) = &col.parent {
                if !column_index.contains_key(parent) {
                    return Err(SchemaError::UnknownParentColumn {
                        table: def.name,
                        column: col.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name: def.name,
            description: def.description,
            columns,
            column_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[DatasetTableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&DatasetTableColumn> {
        self.column_index.get(name).map(|&i| &self.columns[i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }
}
