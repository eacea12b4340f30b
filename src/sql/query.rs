//! Query builder - construct SELECT statements with a fluent API.

use super::expr::{Expr, ExprExt};
use super::token::{Token, TokenStream};

// =============================================================================
// Select Expression (column with optional alias)
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = self.expr.to_tokens();
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        SelectExpr::new(expr)
    }
}

// =============================================================================
// Table Sources
// =============================================================================

/// A plain table reference with optional alias.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.table.clone()));
        if let Some(alias) = &self.alias {
            ts.space()
                .push(Token::As)
                .space()
                .push(Token::Ident(alias.clone()));
        }
        ts
    }
}

/// Something a query can select FROM or join against.
///
/// `Derived` carries a trusted raw fragment - a rendered fast-view template
/// or the time-zone wrapper around a cache table - and is always aliased.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(TableRef),
    Derived { sql: String, alias: String },
}

impl TableSource {
    /// Alias the source is visible under, when one is set.
    pub fn alias(&self) -> Option<&str> {
        match self {
            TableSource::Table(t) => t.alias.as_deref(),
            TableSource::Derived { alias, .. } => Some(alias),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        match self {
            TableSource::Table(t) => t.to_tokens(),
            TableSource::Derived { sql, alias } => {
                let mut ts = TokenStream::new();
                ts.push(Token::Raw(sql.clone()))
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
                ts
            }
        }
    }
}

impl From<TableRef> for TableSource {
    fn from(t: TableRef) -> Self {
        TableSource::Table(t)
    }
}

// =============================================================================
// Joins
// =============================================================================

/// Type of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableSource,
    pub on: Expr,
}

impl Join {
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self.join_type {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::Left => ts.push(Token::Left),
        };

        ts.space().push(Token::Join).space();
        ts.append(&self.table.to_tokens());
        ts.space().push(Token::On).space();
        ts.append(&self.on.to_tokens());

        ts
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// A SELECT query.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use = "Query has no effect until converted to SQL with to_sql()"]
pub struct Query {
    pub select: Vec<SelectExpr>,
    pub from: Option<TableSource>,
    /// Complete raw join clauses (cross-join unnest fragments), emitted
    /// between FROM and the structured joins.
    pub raw_joins: Vec<String>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
}

impl Query {
    /// Create a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the SELECT list.
    pub fn select(mut self, exprs: Vec<impl Into<SelectExpr>>) -> Self {
        self.select = exprs.into_iter().map(|e| e.into()).collect();
        self
    }

    /// Append one SELECT item.
    pub fn select_item(mut self, item: impl Into<SelectExpr>) -> Self {
        self.select.push(item.into());
        self
    }

    /// Set the FROM source.
    pub fn from(mut self, source: impl Into<TableSource>) -> Self {
        self.from = Some(source.into());
        self
    }

    /// Set the FROM source to a derived (raw) fragment with an alias.
    pub fn from_derived(mut self, sql: &str, alias: &str) -> Self {
        self.from = Some(TableSource::Derived {
            sql: sql.into(),
            alias: alias.into(),
        });
        self
    }

    /// Append a complete raw join clause (e.g. a CROSS JOIN unnest).
    pub fn raw_join(mut self, clause: &str) -> Self {
        self.raw_joins.push(clause.into());
        self
    }

    /// Add a JOIN.
    pub fn join(mut self, join_type: JoinType, table: impl Into<TableSource>, on: Expr) -> Self {
        self.joins.push(Join {
            join_type,
            table: table.into(),
            on,
        });
        self
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: impl Into<TableSource>, on: Expr) -> Self {
        self.join(JoinType::Left, table, on)
    }

    /// AND a predicate into the WHERE clause.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.where_clause = Some(match self.where_clause {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Append a GROUP BY expression.
    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        // SELECT list
        ts.push(Token::Select).space();
        for (i, item) in self.select.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&item.to_tokens());
        }

        // FROM
        if let Some(from) = &self.from {
            ts.push(Token::Newline).push(Token::From).space();
            ts.append(&from.to_tokens());
        }

        // Raw join clauses (cross joins for multi-valued columns)
        for clause in &self.raw_joins {
            ts.push(Token::Newline).push(Token::Raw(clause.clone()));
        }

        // Structured joins
        for join in &self.joins {
            ts.push(Token::Newline).append(&join.to_tokens());
        }

        // WHERE
        if let Some(where_clause) = &self.where_clause {
            ts.push(Token::Newline).push(Token::Where).space();
            ts.append(&where_clause.to_tokens());
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            ts.push(Token::Newline).push(Token::GroupBy).space();
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&expr.to_tokens());
            }
        }

        ts
    }

    /// Serialize to a SQL string.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}
