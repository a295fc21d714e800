//! Compilation from a validated request to parameterized SQL.
//!
//! ```text
//! QueryRequest → Query (sql::query) → TokenStream → SQL text + BoundParams
//! ```
//!
//! # Example
//!
//! ```ignore
//! use anyset::compile::{compile_query, CompileOptions};
//! use anyset::sql::Dialect;
//!
//! let options = CompileOptions::default().with_dialect(Dialect::Snowflake);
//! let compiled = compile_query(&request, options)?;
//! println!("{}", compiled.sql);
//! ```

use std::sync::Arc;

use crate::model::{AdapterConfigValue, AdapterKind};
use crate::query::{Aggregation, Filter, QueryRequest};
use crate::sql::expr::{col, func, param, raw_sql, Expr, ExprExt};
use crate::sql::query::{OrderByExpr, Query, SelectExpr, TableRef};
use crate::sql::{BoundParams, Dialect, ParamValue, SortDir};

/// Adapter config key naming the schema tables live in.
pub const SCHEMA_CONFIG_KEY: &str = "schema";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
///
/// A validated request always compiles; any of these is a defect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("compilation invariant violated: {0}")]
    CompilationInvariantViolated(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// The dialect an adapter kind speaks natively.
    pub fn for_adapter(kind: AdapterKind) -> Self {
        Self {
            dialect: kind.default_dialect(),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A request compiled to SQL, ready for a storage adapter.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// The generated SQL string. Contains placeholders, never values.
    pub sql: String,

    /// Values for every placeholder in `sql`, in emission order.
    pub params: BoundParams,

    /// The dialect used for generation.
    pub dialect: Dialect,

    /// Registry key of the dataset the query targets.
    pub dataset_key: String,

    /// The request this was compiled from.
    pub request: Arc<QueryRequest>,
}

// ============================================================================
// Compilation
// ============================================================================

/// Compile a validated request.
///
/// Deterministic: the same request and options always yield the same SQL
/// and the same parameter list.
pub fn compile_query(request: &QueryRequest, options: CompileOptions) -> CompileResult<CompiledQuery> {
    let dataset = request.dataset();
    let mut params = BoundParams::new();

    let mut select: Vec<SelectExpr> = request
        .select()
        .iter()
        .map(|s| col(&s.column).alias(&s.alias))
        .collect();

    for aggregation in request.aggregations() {
        select.push(aggregation_expr(request, aggregation)?);
    }

    let mut table = TableRef::new(request.table_name());
    if let Some(AdapterConfigValue::Text(schema)) = dataset.adapter_config().get(SCHEMA_CONFIG_KEY) {
        if !schema.is_empty() {
            table = table.with_schema(schema);
        }
    }

    let mut query = if select.is_empty() {
        Query::new().select_star()
    } else {
        Query::new().select(select)
    }
    .from(table);

    for filter in request.filters() {
        if let Some(condition) = filter_expr(filter, &mut params) {
            query = query.filter(condition);
        }
    }

    if !request.group_by().is_empty() {
        query = query.group_by(request.group_by().iter().map(|name| col(name)).collect());
    }

    if !request.order_by().is_empty() {
        query = query.order_by(
            request
                .order_by()
                .iter()
                .map(|o| match o.direction {
                    SortDir::Asc => OrderByExpr::asc(col(&o.column)),
                    SortDir::Desc => OrderByExpr::desc(col(&o.column)),
                })
                .collect(),
        );
    }

    let pagination = request.pagination();
    query = query.limit(pagination.limit()).offset(pagination.offset());

    let tokens = query.to_tokens_for_dialect(options.dialect);
    let placeholders = tokens.param_names();
    if placeholders != params.names() {
        return Err(CompileError::CompilationInvariantViolated(format!(
            "placeholders {:?} do not match bound parameters {:?}",
            placeholders,
            params.names()
        )));
    }

    Ok(CompiledQuery {
        sql: tokens.serialize(options.dialect),
        params,
        dialect: options.dialect,
        dataset_key: dataset.key(),
        request: Arc::new(request.clone()),
    })
}

fn aggregation_expr(request: &QueryRequest, aggregation: &Aggregation) -> CompileResult<SelectExpr> {
    match aggregation {
        Aggregation::Standard {
            column,
            function,
            alias,
        } => Ok(func(function.as_sql(), vec![col(column)]).alias(alias)),
        Aggregation::Custom { function, alias } => {
            // Trusted text from the dataset definition, never from the caller.
            let expression = request.dataset().custom_aggregation(function).ok_or_else(|| {
                CompileError::CompilationInvariantViolated(format!(
                    "custom aggregation '{}' vanished after validation",
                    function
                ))
            })?;
            Ok(raw_sql(expression).alias(alias))
        }
    }
}

/// `None` when the filter constrains nothing.
fn filter_expr(filter: &Filter, params: &mut BoundParams) -> Option<Expr> {
    match filter {
        Filter::Category(f) => {
            if f.values.is_empty() {
                return None;
            }
            let name = params.bind(ParamValue::TextList(f.values.clone()));
            Some(col(&f.column).in_list(vec![param(&name)]))
        }
        Filter::Fact(f) => {
            let lower = f.min.map(|min| {
                let name = params.bind(ParamValue::Number(min));
                col(&f.column).gte(param(&name))
            });
            let upper = f.max.map(|max| {
                let name = params.bind(ParamValue::Number(max));
                col(&f.column).lte(param(&name))
            });
            match (lower, upper) {
                (Some(l), Some(u)) => Some(l.and(u)),
                (l, u) => l.or(u),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
