//! In-process adapter that evaluates requests over rows held in memory.
//!
//! Backs datasets whose rows are declared inline in configuration, and
//! serves as the reference implementation of the storage port in tests.
//! It evaluates the canonical request carried by the compiled query rather
//! than parsing SQL; bound parameters are not consulted.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::compile::CompiledQuery;
use crate::model::{AdapterKind, ColumnDataType, Dataset, DatasetTable};
use crate::query::{Aggregation, AggregationFunction, Filter, QueryRequest};
use crate::sql::SortDir;

use super::{
    CellValue, ColumnData, ColumnRef, ConnectionGate, RawRow, RawRowStream, ResultColumn,
    ResultSet, StorageError, StoragePort, StorageResult,
};

const ADAPTER_NAME: &str = "InMemory";

#[derive(Debug)]
pub struct InMemoryAdapter {
    dataset: Arc<Dataset>,
    /// Rows per table, aligned with the table's column order.
    tables: HashMap<String, Vec<RawRow>>,
    gate: ConnectionGate,
}

impl InMemoryAdapter {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_gate(dataset, ConnectionGate::default())
    }

    pub fn with_gate(dataset: Arc<Dataset>, gate: ConnectionGate) -> Self {
        Self {
            dataset,
            tables: HashMap::new(),
            gate,
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Append rows to `table`. Each row holds one cell per declared column.
    pub fn insert_rows(&mut self, table: &str, rows: Vec<RawRow>) -> StorageResult<()> {
        let width = self.table_def(table)?.columns().len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(StorageError::MalformedResult(format!(
                "row for table '{}' has {} cells, expected {}",
                table,
                bad.len(),
                width
            )));
        }
        self.tables.entry(table.to_string()).or_default().extend(rows);
        Ok(())
    }

    /// Append JSON objects keyed by column name. Missing keys read as null.
    pub fn insert_json_rows(
        &mut self,
        table: &str,
        rows: &[serde_json::Map<String, serde_json::Value>],
    ) -> StorageResult<()> {
        let table_def = self.table_def(table)?;
        let mut converted = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(unknown) = row.keys().find(|k| !table_def.has_column(k)) {
                return Err(StorageError::MalformedResult(format!(
                    "unknown column '{}' in rows for table '{}'",
                    unknown, table
                )));
            }
            let cells = table_def
                .columns()
                .iter()
                .map(|c| match row.get(c.name()) {
                    Some(v) => CellValue::from_json(v, c.data_type()),
                    None => Ok(CellValue::Null),
                })
                .collect::<StorageResult<RawRow>>()?;
            converted.push(cells);
        }
        self.insert_rows(table, converted)
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, Vec::len)
    }

    fn table_def(&self, table: &str) -> StorageResult<&DatasetTable> {
        self.dataset.table(table).ok_or_else(|| {
            StorageError::MalformedResult(format!(
                "table '{}' is not part of dataset '{}'",
                table,
                self.dataset.name()
            ))
        })
    }

    fn rows(&self, table: &str) -> &[RawRow] {
        self.tables.get(table).map_or(&[], Vec::as_slice)
    }
}

#[async_trait]
impl StoragePort for InMemoryAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::InMemory
    }

    async fn execute_query(&self, query: &CompiledQuery) -> StorageResult<ResultSet> {
        let _permit = self.gate.acquire().await?;

        let failed = |message: String| StorageError::QueryFailed {
            dataset: self.dataset.key(),
            sql: query.sql.clone(),
            message,
        };

        if query.dataset_key != self.dataset.key() {
            return Err(failed(format!(
                "query targets dataset '{}'",
                query.dataset_key
            )));
        }

        let request = &query.request;
        let table = self
            .dataset
            .table(request.table_name())
            .ok_or_else(|| failed(format!("no table '{}'", request.table_name())))?;

        let columns = evaluate(request, table, self.rows(table.name())).map_err(|e| match e {
            Evaluation::MissingColumn(name) => failed(format!("no column '{}'", name)),
            Evaluation::Storage(err) => err,
        })?;

        let result = ResultSet::new(self.dataset.id(), self.dataset.version(), columns)?;
        tracing::debug!(
            dataset = %self.dataset.key(),
            table = request.table_name(),
            rows = result.rows(),
            "in-memory query evaluated"
        );
        Ok(result)
    }

    async fn fetch_raw_filter_data(&self, columns: &[ColumnRef]) -> StorageResult<RawRowStream> {
        let _permit = self.gate.acquire().await?;

        let Some(first) = columns.first() else {
            return Ok(stream::empty().boxed());
        };
        if let Some(other) = columns.iter().find(|c| c.table != first.table) {
            return Err(StorageError::Unsupported {
                adapter: ADAPTER_NAME.into(),
                message: format!(
                    "filter data spanning tables '{}' and '{}'",
                    first.table, other.table
                ),
            });
        }

        let table = self.table_def(&first.table)?;
        let indices = columns
            .iter()
            .map(|c| {
                column_index(table, &c.column).ok_or_else(|| {
                    StorageError::MalformedResult(format!(
                        "no column '{}' in table '{}'",
                        c.column, c.table
                    ))
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let rows: Vec<StorageResult<RawRow>> = self
            .rows(&first.table)
            .iter()
            .map(|row| Ok(indices.iter().map(|&i| row[i].clone()).collect()))
            .collect();
        Ok(stream::iter(rows).boxed())
    }

    fn close(&self) {
        self.gate.close();
    }
}

// ============================================================================
// Evaluation
// ============================================================================

enum Evaluation {
    MissingColumn(String),
    Storage(StorageError),
}

impl From<StorageError> for Evaluation {
    fn from(err: StorageError) -> Self {
        Evaluation::Storage(err)
    }
}

/// One output column of the evaluated query.
enum Output<'a> {
    Source {
        alias: &'a str,
        index: usize,
        data_type: ColumnDataType,
    },
    Aggregate {
        alias: &'a str,
        function: AggregationFunction,
        index: usize,
    },
}

impl Output<'_> {
    fn alias(&self) -> &str {
        match self {
            Output::Source { alias, .. } | Output::Aggregate { alias, .. } => alias,
        }
    }
}

/// A projected row plus the first source row behind it, for ordering on
/// columns that were not projected.
struct OutputRow<'r> {
    cells: Vec<CellValue>,
    source: Option<&'r RawRow>,
}

enum SortKey {
    Output(usize),
    Source(usize),
}

fn column_index(table: &DatasetTable, name: &str) -> Option<usize> {
    table.columns().iter().position(|c| c.name() == name)
}

fn evaluate(
    request: &QueryRequest,
    table: &DatasetTable,
    rows: &[RawRow],
) -> Result<Vec<ResultColumn>, Evaluation> {
    let index_of = |name: &str| {
        column_index(table, name).ok_or_else(|| Evaluation::MissingColumn(name.to_string()))
    };

    let outputs = plan_outputs(request, table)?;

    // Filter
    let mut predicates = Vec::with_capacity(request.filters().len());
    for filter in request.filters() {
        predicates.push((index_of(filter.column())?, filter));
    }
    let filtered = rows
        .iter()
        .filter(|row| predicates.iter().all(|(i, f)| row_matches(&row[*i], f)));

    // Group
    let grouping = !request.group_by().is_empty() || !request.aggregations().is_empty();
    let groups: Vec<Vec<&RawRow>> = if grouping {
        let key_columns: Vec<usize> = request
            .group_by()
            .iter()
            .filter_map(|name| {
                request
                    .select()
                    .iter()
                    .find(|s| &s.alias == name)
                    .map(|s| s.column.as_str())
                    .or(Some(name.as_str()))
                    .and_then(|column| column_index(table, column))
            })
            .collect();

        let mut index: HashMap<Vec<Option<String>>, usize> = HashMap::new();
        let mut groups: Vec<Vec<&RawRow>> = Vec::new();
        for row in filtered {
            let key: Vec<Option<String>> = key_columns.iter().map(|&i| row[i].to_label()).collect();
            match index.get(&key) {
                Some(&g) => groups[g].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }
        // Aggregating with no grouping key yields exactly one row.
        if groups.is_empty() && key_columns.is_empty() {
            groups.push(Vec::new());
        }
        groups
    } else {
        filtered.map(|row| vec![row]).collect()
    };

    // Project
    let mut output_rows: Vec<OutputRow<'_>> = groups
        .iter()
        .map(|group| OutputRow {
            cells: outputs
                .iter()
                .map(|o| match o {
                    Output::Source { index, .. } => group
                        .first()
                        .map_or(CellValue::Null, |row| row[*index].clone()),
                    Output::Aggregate {
                        function, index, ..
                    } => aggregate(*function, group.iter().map(|row| &row[*index])),
                })
                .collect(),
            source: group.first().copied(),
        })
        .collect();

    // Order
    let sort_keys: Vec<(SortKey, SortDir)> = request
        .order_by()
        .iter()
        .filter_map(|o| {
            let key = outputs
                .iter()
                .position(|out| out.alias() == o.column)
                .map(SortKey::Output)
                .or_else(|| column_index(table, &o.column).map(SortKey::Source))?;
            Some((key, o.direction))
        })
        .collect();

    if !sort_keys.is_empty() {
        output_rows.sort_by(|a, b| {
            sort_keys
                .iter()
                .map(|(key, dir)| {
                    let ord = match key {
                        SortKey::Output(i) => a.cells[*i].sort_cmp(&b.cells[*i]),
                        SortKey::Source(i) => match (a.source, b.source) {
                            (Some(ra), Some(rb)) => ra[*i].sort_cmp(&rb[*i]),
                            _ => std::cmp::Ordering::Equal,
                        },
                    };
                    match dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    // Paginate
    let pagination = request.pagination();
    let page: Vec<OutputRow<'_>> = output_rows
        .into_iter()
        .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
        .collect();

    // Columnize
    let mut columns = Vec::with_capacity(outputs.len());
    for (j, output) in outputs.iter().enumerate() {
        let data_type = match output {
            Output::Source { data_type, .. } => *data_type,
            Output::Aggregate { .. } => ColumnDataType::Number,
        };
        let cells = page.iter().map(|row| row.cells[j].clone()).collect();
        columns.push(ResultColumn {
            alias: output.alias().to_string(),
            breakdown: None,
            data: ColumnData::from_cells(data_type, cells)?,
        });
    }
    Ok(columns)
}

fn plan_outputs<'a>(
    request: &'a QueryRequest,
    table: &'a DatasetTable,
) -> Result<Vec<Output<'a>>, Evaluation> {
    if request.select().is_empty() && request.aggregations().is_empty() {
        return Ok(table
            .columns()
            .iter()
            .enumerate()
            .map(|(index, c)| Output::Source {
                alias: c.name(),
                index,
                data_type: c.data_type(),
            })
            .collect());
    }

    let mut outputs = Vec::new();
    for item in request.select() {
        let index = column_index(table, &item.column)
            .ok_or_else(|| Evaluation::MissingColumn(item.column.clone()))?;
        outputs.push(Output::Source {
            alias: item.alias.as_str(),
            index,
            data_type: table.columns()[index].data_type(),
        });
    }
    for aggregation in request.aggregations() {
        match aggregation {
            Aggregation::Standard {
                column,
                function,
                alias,
            } => {
                let index = column_index(table, column)
                    .ok_or_else(|| Evaluation::MissingColumn(column.clone()))?;
                outputs.push(Output::Aggregate {
                    alias: alias.as_str(),
                    function: *function,
                    index,
                });
            }
            Aggregation::Custom { function, .. } => {
                return Err(Evaluation::Storage(StorageError::Unsupported {
                    adapter: ADAPTER_NAME.into(),
                    message: format!("custom aggregation '{}'", function),
                }));
            }
        }
    }
    Ok(outputs)
}

fn row_matches(cell: &CellValue, filter: &Filter) -> bool {
    match filter {
        Filter::Category(f) => {
            f.values.is_empty() || cell.to_label().is_some_and(|label| f.values.contains(&label))
        }
        Filter::Fact(f) => cell.as_f64().is_some_and(|v| {
            f.min.map_or(true, |min| v >= min) && f.max.map_or(true, |max| v <= max)
        }),
    }
}

fn aggregate<'a>(function: AggregationFunction, cells: impl Iterator<Item = &'a CellValue>) -> CellValue {
    let mut values: Vec<f64> = cells.filter_map(CellValue::as_f64).collect();
    if function == AggregationFunction::Count {
        return CellValue::Number(values.len() as f64);
    }
    if values.is_empty() {
        return CellValue::Null;
    }

    let n = values.len();
    let result = match function {
        AggregationFunction::Count => n as f64,
        AggregationFunction::Sum => values.iter().sum(),
        AggregationFunction::Avg => values.iter().sum::<f64>() / n as f64,
        AggregationFunction::Median => {
            values.sort_by(f64::total_cmp);
            if n % 2 == 1 {
                values[n / 2]
            } else {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            }
        }
        AggregationFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    CellValue::Number(result)
}
