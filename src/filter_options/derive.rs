//! Pure derivation of filter options from raw rows.

use std::collections::HashMap;

use crate::model::{ColumnClassification, SchemaError};
use crate::storage::{format_number, CellValue, RawRow};

use super::{FilterOption, FilterOptionValue, FilterOptionsError, FilterOptionsResult, HierarchyNode};

/// One option per Category or Fact column; other classifications are skipped.
///
/// `rows` hold one value per entry of `columns`. Nulls are ignored, and a
/// fact column with no values at all yields no option.
pub fn derive_simple_options(
    columns: &[(&str, ColumnClassification)],
    rows: &[RawRow],
) -> FilterOptionsResult<Vec<FilterOption>> {
    check_shape(columns.len(), rows)?;

    let mut options = Vec::new();
    for (i, &(name, classification)) in columns.iter().enumerate() {
        match classification {
            ColumnClassification::Category => options.push(FilterOption::Category {
                name: name.to_string(),
                values: distinct_values(rows.iter().map(|r| &r[i])),
                parent_id: None,
            }),
            ColumnClassification::Fact => {
                if let Some(option) = min_max(name, rows.iter().map(|r| &r[i]))? {
                    options.push(option);
                }
            }
            ColumnClassification::DateTime | ColumnClassification::Other => {}
        }
    }
    Ok(options)
}

/// Build the drill-down tree for a hierarchy whose levels are `levels`.
///
/// Rows are grouped by the first level's value in first-seen order, and
/// each group recurses into the remaining levels. The last level is a
/// plain category option whose `parent_id` is the value above it. A single
/// level degenerates to a category option named after the hierarchy.
pub fn derive_hierarchy(name: &str, levels: &[&str], rows: &[RawRow]) -> FilterOptionsResult<FilterOption> {
    if levels.is_empty() {
        return Err(SchemaError::EmptyHierarchy(name.to_string()).into());
    }
    check_shape(levels.len(), rows)?;

    let rows: Vec<&RawRow> = rows.iter().collect();
    Ok(build_level(name, levels, 0, &rows, None))
}

fn build_level(name: &str, levels: &[&str], depth: usize, rows: &[&RawRow], parent: Option<&str>) -> FilterOption {
    if depth + 1 == levels.len() {
        return FilterOption::Category {
            name: name.to_string(),
            values: distinct_values(rows.iter().map(|r| &r[depth])),
            parent_id: parent.map(str::to_string),
        };
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&RawRow>> = HashMap::new();
    for &row in rows {
        let Some(label) = row[depth].to_label() else {
            continue;
        };
        groups
            .entry(label.clone())
            .or_insert_with(|| {
                order.push(label);
                Vec::new()
            })
            .push(row);
    }

    let values = order
        .into_iter()
        .map(|value| {
            let group = groups.remove(&value).unwrap_or_default();
            let children = build_level(levels[depth + 1], levels, depth + 1, &group, Some(&value));
            HierarchyNode {
                label: value.clone(),
                value,
                children: Box::new(children),
            }
        })
        .collect();

    FilterOption::Hierarchy {
        name: name.to_string(),
        values,
    }
}

fn check_shape(expected: usize, rows: &[RawRow]) -> FilterOptionsResult<()> {
    match rows.iter().find(|r| r.len() != expected) {
        Some(row) => Err(FilterOptionsError::RowShapeMismatch {
            expected,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

fn distinct_values<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<FilterOptionValue<String>> {
    let mut seen = std::collections::HashSet::new();
    cells
        .filter_map(CellValue::to_label)
        .filter(|label| seen.insert(label.clone()))
        .map(|label| FilterOptionValue {
            value: label.clone(),
            label,
        })
        .collect()
}

fn min_max<'a>(
    name: &str,
    cells: impl Iterator<Item = &'a CellValue>,
) -> FilterOptionsResult<Option<FilterOption>> {
    let mut range: Option<(f64, f64)> = None;
    for cell in cells {
        let value = match cell {
            CellValue::Null => continue,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().map_err(|_| non_numeric(name, cell))?,
            other => return Err(non_numeric(name, other)),
        };
        range = Some(match range {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        });
    }

    Ok(range.map(|(lo, hi)| FilterOption::MinMax {
        name: name.to_string(),
        values: (
            FilterOptionValue {
                label: format_number(lo),
                value: lo,
            },
            FilterOptionValue {
                label: format_number(hi),
                value: hi,
            },
        ),
    }))
}

fn non_numeric(column: &str, cell: &CellValue) -> FilterOptionsError {
    FilterOptionsError::NonNumericFactValue {
        column: column.to_string(),
        value: cell.to_label().unwrap_or_default(),
    }
}
