//! The bound dataset: tables, custom aggregations, hierarchies, and the
//! per-classification column index built once at bind time.

use std::collections::{BTreeMap, HashMap, HashSet};

use inflector::cases::kebabcase::to_kebab_case;
use serde::{Deserialize, Serialize};

use super::hierarchy::CategoryHierarchy;
use super::table::{DatasetTable, TableDefinition};
use super::{AdapterConfigValue, AdapterKind, ColumnClassification, SchemaError};

/// A dataset as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path_prefix: String,
    pub version: u32,
    pub adapter: AdapterKind,
    #[serde(default)]
    pub adapter_config: BTreeMap<String, AdapterConfigValue>,
    pub tables: Vec<TableDefinition>,
    /// Function name -> trusted SQL expression.
    #[serde(default)]
    pub custom_aggregation_functions: BTreeMap<String, String>,
    #[serde(default)]
    pub category_hierarchies: Vec<CategoryHierarchy>,
}

/// Column names of one classification within one table.
#[derive(Debug, Clone, Default, PartialEq)]
struct ClassifiedColumns {
    ordered: Vec<String>,
    members: HashSet<String>,
}

/// A validated, immutable dataset.
///
/// Shared across requests behind an `Arc`; a reload binds a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    description: Option<String>,
    path_prefix: String,
    version: u32,
    adapter: AdapterKind,
    adapter_config: BTreeMap<String, AdapterConfigValue>,
    tables: Vec<DatasetTable>,
    table_index: HashMap<String, usize>,
    custom_aggregations: BTreeMap<String, String>,
    hierarchies: Vec<CategoryHierarchy>,
    classified: HashMap<ColumnClassification, HashMap<String, ClassifiedColumns>>,
}

impl Dataset {
    /// Validate a definition and build the classification index.
    pub fn bind(def: DatasetDefinition) -> Result<Self, SchemaError> {
        let mut tables = Vec::with_capacity(def.tables.len());
        let mut table_index = HashMap::with_capacity(def.tables.len());

        for table_def in def.tables {
            if table_index.contains_key(&table_def.name) {
                return Err(SchemaError::DuplicateTable(table_def.name));
            }
            let table = DatasetTable::bind(table_def)?;
            table_index.insert(table.name().to_string(), tables.len());
            tables.push(table);
        }

        for hierarchy in &def.category_hierarchies {
            hierarchy.check(|name| table_index.get(name).map(|&i| &tables[i]))?;
        }

        let mut classified: HashMap<ColumnClassification, HashMap<String, ClassifiedColumns>> =
            ColumnClassification::ALL
                .iter()
                .map(|&c| (c, HashMap::new()))
                .collect();

        for table in &tables {
            for classification in ColumnClassification::ALL {
                let entry = classified
                    .entry(classification)
                    .or_default()
                    .entry(table.name().to_string())
                    .or_default();
                for col in table
                    .columns()
                    .iter()
                    .filter(|c| c.classification() == classification)
                {
                    entry.ordered.push(col.name().to_string());
                    entry.members.insert(col.name().to_string());
                }
            }
        }

        Ok(Self {
            name: def.name,
            description: def.description,
            path_prefix: def.path_prefix,
            version: def.version,
            adapter: def.adapter,
            adapter_config: def.adapter_config,
            tables,
            table_index,
            custom_aggregations: def.custom_aggregation_functions,
            hierarchies: def.category_hierarchies,
            classified,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn adapter(&self) -> AdapterKind {
        self.adapter
    }

    pub fn adapter_config(&self) -> &BTreeMap<String, AdapterConfigValue> {
        &self.adapter_config
    }

    /// Slug identifier reported in result sets, e.g. `dataset-sales-data`.
    pub fn id(&self) -> String {
        to_kebab_case(&format!("Dataset {}", self.name))
    }

    /// Registry key: `{path_prefix}/v{version}`.
    pub fn key(&self) -> String {
        format!("{}/v{}", self.path_prefix.trim_matches('/'), self.version)
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[DatasetTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&DatasetTable> {
        self.table_index.get(name).map(|&i| &self.tables[i])
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table_index.contains_key(name)
    }

    /// The trusted SQL expression behind a custom aggregation name.
    pub fn custom_aggregation(&self, name: &str) -> Option<&str> {
        self.custom_aggregations.get(name).map(String::as_str)
    }

    pub fn custom_aggregations(&self) -> &BTreeMap<String, String> {
        &self.custom_aggregations
    }

    pub fn hierarchies(&self) -> &[CategoryHierarchy] {
        &self.hierarchies
    }

    /// Whether `column` of `table` carries `classification`.
    ///
    /// Fails when the table or column does not exist, so a typo is never
    /// mistaken for "wrong classification".
    pub fn is_column_classified_as(
        &self,
        column: &str,
        classification: ColumnClassification,
        table: &str,
    ) -> Result<bool, SchemaError> {
        let table_def = self
            .table(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_string()))?;
        if !table_def.has_column(column) {
            return Err(SchemaError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }

        Ok(self
            .classified
            .get(&classification)
            .and_then(|by_table| by_table.get(table))
            .is_some_and(|cols| cols.members.contains(column)))
    }

    /// As [`Dataset::is_column_classified_as`], with the classification given
    /// by name (`"Category"`, `"DateTime"`, `"Fact"`, `"Other"`).
    pub fn is_column_classified_as_named(
        &self,
        column: &str,
        classification: &str,
        table: &str,
    ) -> Result<bool, SchemaError> {
        let classification: ColumnClassification = classification.parse()?;
        self.is_column_classified_as(column, classification, table)
    }

    /// Column names of one classification in declaration order.
    pub fn columns_classified_as(
        &self,
        classification: ColumnClassification,
        table: &str,
    ) -> Result<&[String], SchemaError> {
        if !self.has_table(table) {
            return Err(SchemaError::UnknownTable(table.to_string()));
        }
        Ok(self
            .classified
            .get(&classification)
            .and_then(|by_table| by_table.get(table))
            .map(|cols| cols.ordered.as_slice())
            .unwrap_or(&[]))
    }
}
