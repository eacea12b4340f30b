//! DDL support - CREATE TABLE for physical cache tables.
//!
//! The registry derives each cache table's schema from the requested
//! column set; this builder turns that schema into the statement text.

use super::token::{Token, TokenStream};
use super::types::DataType;

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateTable {
    pub if_not_exists: bool,
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl CreateTable {
    /// Create a new CREATE TABLE statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            if_not_exists: false,
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add IF NOT EXISTS clause.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add a column definition.
    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    /// Add multiple column definitions.
    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Table);

        if self.if_not_exists {
            ts.space()
                .push(Token::If)
                .space()
                .push(Token::Not)
                .space()
                .push(Token::Exists);
        }

        ts.space().push(Token::Ident(self.name.clone()));

        ts.space().lparen();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&col.to_tokens());
        }
        ts.rparen();

        ts
    }

    /// Serialize to a SQL string.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }
}

// ============================================================================
// Column Definition
// ============================================================================

/// Column definition for CREATE TABLE.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub primary_key_autoincrement: bool,
}

impl ColumnDef {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key_autoincrement: false,
        }
    }

    /// Mark the column as the synthetic auto-incrementing row identifier.
    pub fn primary_key_autoincrement(mut self) -> Self {
        self.primary_key_autoincrement = true;
        self
    }

    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()))
            .space()
            .push(Token::Raw(self.data_type.as_sql().into()));
        if self.primary_key_autoincrement {
            ts.space()
                .push(Token::Primary)
                .space()
                .push(Token::Key)
                .space()
                .push(Token::Autoincrement);
        }
        ts
    }
}
