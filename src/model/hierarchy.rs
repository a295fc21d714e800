//! Declared category hierarchies (drill-down chains).

use serde::{Deserialize, Serialize};

use super::table::DatasetTable;
use super::{ColumnClassification, HierarchyColumnFault, SchemaError};

/// One level of a hierarchy chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub table: String,
    pub column: String,
}

impl HierarchyLevel {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// A named chain of Category columns, outermost level first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryHierarchy {
    pub name: String,
    pub levels: Vec<HierarchyLevel>,
}

impl CategoryHierarchy {
    /// Every level must name an existing Category column, and all levels
    /// must sit in the same table.
    pub(crate) fn check<'a>(
        &self,
        lookup: impl Fn(&str) -> Option<&'a DatasetTable>,
    ) -> Result<(), SchemaError> {
        if self.levels.is_empty() {
            return Err(SchemaError::EmptyHierarchy(self.name.clone()));
        }

        let first_table = &self.levels[0].table;
        for level in &self.levels {
            let fault = match lookup(&level.table) {
                None => Some(HierarchyColumnFault::MissingTable),
                Some(_) if &level.table != first_table => {
                    Some(HierarchyColumnFault::TableMismatch(first_table.clone()))
                }
                Some(table) => match table.column(&level.column) {
                    None => Some(HierarchyColumnFault::MissingColumn),
                    Some(col) if col.classification() != ColumnClassification::Category => {
                        Some(HierarchyColumnFault::NotCategory(col.classification()))
                    }
                    Some(_) => None,
                },
            };

            if let Some(reason) = fault {
                return Err(SchemaError::InvalidHierarchyColumn {
                    hierarchy: self.name.clone(),
                    table: level.table.clone(),
                    column: level.column.clone(),
                    reason,
                });
            }
        }

        Ok(())
    }

    /// Column names in chain order.
    pub fn column_names(&self) -> Vec<&str> {
        self.levels.iter().map(|l| l.column.as_str()).collect()
    }
}
