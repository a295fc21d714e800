//! SQL generation module.
//!
//! This module provides the type-safe SQL builder a dataset query compiles
//! through. It includes:
//!
//! - [`query`] - single-table SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`params`] - named bind parameters
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod params;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{col, func, param, raw_sql, star, BinaryOperator, Expr, ExprExt};
pub use params::{BoundParam, BoundParams, ParamValue};
pub use query::{LimitOffset, OrderByExpr, Query, SelectExpr, SortDir, TableRef};
pub use token::{Token, TokenStream};
