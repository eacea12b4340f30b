//! SQL generation module.
//!
//! A type-safe, token-based SQL builder for the statements this crate emits:
//! serving queries, extraction queries, and the registry's metadata DML/DDL.
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`ddl`] - CREATE TABLE for physical cache tables
//! - [`dml`] - INSERT with conflict handling for registry metadata
//! - [`token`] - Token types for SQL generation
//! - [`types`] - Physical column types

pub mod ddl;
pub mod dml;
pub mod expr;
pub mod query;
pub mod token;
pub mod types;

// Re-export commonly used types at the sql module level
pub use ddl::{ColumnDef, CreateTable};
pub use dml::Insert;
pub use expr::{
    col, func, lit_int, lit_null, lit_str, param, raw, star, sum, table_col, BinaryOperator, Expr,
    ExprExt, Literal,
};
pub use query::{Join, JoinType, Query, SelectExpr, TableRef, TableSource};
pub use token::{Token, TokenStream};
pub use types::DataType;
