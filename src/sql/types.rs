//! Physical column types for cache-table DDL.
//!
//! The catalog declares a storage type per cache-backed column; the
//! registry turns it into the column type of the physical cache table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical SQL data type.
///
/// Covers exactly the types cache tables are built from. `Integer` exists
/// for the synthetic row identifier; catalog columns use the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Plain INTEGER (synthetic row id).
    Integer,
    /// 64-bit signed integer.
    BigInt,
    /// Double-precision float.
    Double,
    /// Variable-length string.
    Text,
    /// Date without time.
    Date,
}

impl DataType {
    /// The SQL keyword for this type.
    pub fn as_sql(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Double => "DOUBLE",
            DataType::Text => "TEXT",
            DataType::Date => "DATE",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
