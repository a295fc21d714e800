//! Filter options: the legal filter values a UI can offer for a dataset.
//!
//! ```text
//! StoragePort::fetch_raw_filter_data → raw rows → derive → Vec<FilterOption>
//! ```
//!
//! Category columns enumerate their distinct values, fact columns report
//! their observed range, and each declared hierarchy becomes a tree of
//! options keyed by parent value.

mod derive;

use futures::future::try_join_all;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::model::{ColumnClassification, Dataset, SchemaError};
use crate::storage::{ColumnRef, RawRow, StorageError, StoragePort};

pub use derive::{derive_hierarchy, derive_simple_options};

// ============================================================================
// Types
// ============================================================================

/// A label shown to the user and the value sent back in a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptionValue<T> {
    pub label: String,
    pub value: T,
}

/// One parent value in a hierarchy and the options beneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub label: String,
    pub value: String,
    pub children: Box<FilterOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterOption {
    /// Distinct values of a Category column, in first-seen order.
    #[serde(alias = "FilterOptionCategory")]
    Category {
        name: String,
        values: Vec<FilterOptionValue<String>>,
        /// Parent value when this option is a hierarchy leaf.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
    },
    /// Observed range of a Fact column.
    #[serde(rename = "minmax", alias = "FilterOptionMinMax")]
    MinMax {
        name: String,
        values: (FilterOptionValue<f64>, FilterOptionValue<f64>),
    },
    /// A drill-down level: each parent value nests the next level.
    Hierarchy {
        name: String,
        values: Vec<HierarchyNode>,
    },
}

impl FilterOption {
    pub fn name(&self) -> &str {
        match self {
            FilterOption::Category { name, .. }
            | FilterOption::MinMax { name, .. }
            | FilterOption::Hierarchy { name, .. } => name,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterOptionsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("fact column '{column}' holds a non-numeric value: {value}")]
    NonNumericFactValue { column: String, value: String },

    #[error("raw row has {found} values, expected {expected}")]
    RowShapeMismatch { expected: usize, found: usize },
}

pub type FilterOptionsResult<T> = Result<T, FilterOptionsError>;

// ============================================================================
// Collection
// ============================================================================

/// Derive every filter option for `dataset` through `port`.
///
/// Per-table simple options come first, in table declaration order, then
/// one option per declared hierarchy. Tables are fetched concurrently.
pub async fn collect_filter_options(
    dataset: &Dataset,
    port: &dyn StoragePort,
) -> FilterOptionsResult<Vec<FilterOption>> {
    let simple = dataset.tables().iter().filter_map(|table| {
        let columns: Vec<(&str, ColumnClassification)> = table
            .columns()
            .iter()
            .filter(|c| {
                matches!(
                    c.classification(),
                    ColumnClassification::Category | ColumnClassification::Fact
                )
            })
            .map(|c| (c.name(), c.classification()))
            .collect();
        if columns.is_empty() {
            return None;
        }
        let refs: Vec<ColumnRef> = columns
            .iter()
            .map(|(name, _)| ColumnRef::new(table.name(), name))
            .collect();
        Some(async move {
            let rows = fetch_rows(port, &refs).await?;
            derive_simple_options(&columns, &rows)
        })
    });

    let mut options: Vec<FilterOption> = try_join_all(simple).await?.into_iter().flatten().collect();

    for hierarchy in dataset.hierarchies() {
        let refs: Vec<ColumnRef> = hierarchy
            .levels
            .iter()
            .map(|l| ColumnRef::new(&l.table, &l.column))
            .collect();
        let rows = fetch_rows(port, &refs).await?;
        options.push(derive_hierarchy(
            &hierarchy.name,
            &hierarchy.column_names(),
            &rows,
        )?);
    }

    tracing::debug!(
        dataset = %dataset.key(),
        options = options.len(),
        "filter options derived"
    );
    Ok(options)
}

async fn fetch_rows(port: &dyn StoragePort, refs: &[ColumnRef]) -> FilterOptionsResult<Vec<RawRow>> {
    let stream = port.fetch_raw_filter_data(refs).await?;
    Ok(stream.try_collect::<Vec<RawRow>>().await?)
}
