//! DML support - INSERT with conflict handling.
//!
//! The registry's metadata insert is the only write this crate issues:
//! an optimistic `INSERT ... ON CONFLICT DO NOTHING ... RETURNING` whose
//! values are bind parameters supplied by the store driver.

use super::expr::Expr;
use super::token::{Token, TokenStream};

// ============================================================================
// INSERT
// ============================================================================

/// INSERT statement.
#[derive(Debug, Clone)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql()"]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
    pub on_conflict_do_nothing: bool,
    pub returning: Vec<String>,
}

impl Insert {
    /// Create a new INSERT statement.
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
            on_conflict_do_nothing: false,
            returning: Vec::new(),
        }
    }

    /// Set the columns to insert.
    pub fn columns(mut self, cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = cols.into_iter().map(|c| c.into()).collect();
        self
    }

    /// Set the single row of values.
    pub fn values(mut self, vals: impl IntoIterator<Item = Expr>) -> Self {
        self.values = vals.into_iter().collect();
        self
    }

    /// Make a duplicate-key insert a no-op instead of an error.
    pub fn on_conflict_do_nothing(mut self) -> Self {
        self.on_conflict_do_nothing = true;
        self
    }

    /// Add RETURNING columns.
    pub fn returning(mut self, cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.returning = cols.into_iter().map(|c| c.into()).collect();
        self
    }

    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(Token::Ident(self.table.clone()));

        if !self.columns.is_empty() {
            ts.space().lparen();
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(col.clone()));
            }
            ts.rparen();
        }

        if !self.values.is_empty() {
            ts.space().push(Token::Values).space().lparen();
            for (i, val) in self.values.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&val.to_tokens());
            }
            ts.rparen();
        }

        if self.on_conflict_do_nothing {
            ts.space()
                .push(Token::On)
                .space()
                .push(Token::Conflict)
                .space()
                .push(Token::Do)
                .space()
                .push(Token::Nothing);
        }

        if !self.returning.is_empty() {
            ts.space().push(Token::Returning).space();
            for (i, col) in self.returning.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.push(Token::Ident(col.clone()));
            }
        }

        ts
    }

    /// Serialize to a SQL string.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }
}
