//! Expression AST - the core of SQL expression building.
//!
//! A strongly-typed AST for the expressions this crate emits, with
//! exhaustive pattern matching enforced by the compiler.

use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Positional bind parameter (?1, ?2, ...), bound by the store driver.
    Param(usize),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Function call: name(args...)
    Function { name: String, args: Vec<Expr> },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Raw SQL fragment passed directly to output without escaping.
    ///
    /// Never pass user input to this variant. Only catalog-declared
    /// fragments (presentation expressions, source expressions, cross-join
    /// clauses) and scheduler placeholder tokens are allowed here.
    Raw(String),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    String(String),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
}

impl BinaryOperator {
    fn token(&self) -> Token {
        match self {
            BinaryOperator::Eq => Token::Eq,
            BinaryOperator::Ne => Token::Ne,
            BinaryOperator::Lt => Token::Lt,
            BinaryOperator::Gt => Token::Gt,
            BinaryOperator::Lte => Token::Lte,
            BinaryOperator::Gte => Token::Gte,
            BinaryOperator::And => Token::And,
            BinaryOperator::Or => Token::Or,
        }
    }
}

impl Expr {
    /// Convert to a token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => match table {
                Some(t) => {
                    ts.push(Token::QualifiedIdent {
                        qualifier: t.clone(),
                        name: column.clone(),
                    });
                }
                None => {
                    ts.push(Token::Ident(column.clone()));
                }
            },

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Null => Token::Null,
                });
            }

            Expr::Param(n) => {
                ts.push(Token::Param(*n));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens())
                    .space()
                    .push(op.token())
                    .space()
                    .append(&right.to_tokens());
            }

            Expr::Function { name, args } => {
                ts.push(Token::FunctionName(name.clone())).lparen();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ts.comma().space();
                    }
                    ts.append(&arg.to_tokens());
                }
                ts.rparen();
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens()).space().push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Raw(format!("\"{}\".*", t)));
                } else {
                    ts.push(Token::Star);
                }
            }

            Expr::Paren(inner) => {
                ts.lparen().append(&inner.to_tokens()).rparen();
            }

            Expr::Raw(s) => {
                ts.push(Token::Raw(s.clone()));
            }
        }

        ts
    }

    /// Serialize to a SQL string.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Unqualified column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Qualified column reference: table.column.
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Integer literal.
pub fn lit_int(n: i64) -> Expr {
    Expr::Literal(Literal::Int(n))
}

/// String literal.
pub fn lit_str(s: &str) -> Expr {
    Expr::Literal(Literal::String(s.into()))
}

/// NULL literal.
pub fn lit_null() -> Expr {
    Expr::Literal(Literal::Null)
}

/// Positional bind parameter (1-based).
pub fn param(n: usize) -> Expr {
    Expr::Param(n)
}

/// Function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args,
    }
}

/// SUM aggregate.
pub fn sum(expr: Expr) -> Expr {
    func("sum", vec![expr])
}

/// Bare wildcard.
pub fn star() -> Expr {
    Expr::Star { table: None }
}

/// Raw SQL fragment. Trusted catalog fragments only.
pub fn raw(sql: &str) -> Expr {
    Expr::Raw(sql.into())
}

// =============================================================================
// Fluent combinators
// =============================================================================

/// Fluent combinators on expressions.
pub trait ExprExt: Sized {
    fn binary(self, op: BinaryOperator, right: Expr) -> Expr;

    fn eq(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::Eq, right)
    }
    fn gt(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::Gt, right)
    }
    fn gte(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::Gte, right)
    }
    fn lt(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::Lt, right)
    }
    fn and(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::And, right)
    }
    fn or(self, right: Expr) -> Expr {
        self.binary(BinaryOperator::Or, right)
    }
    fn is_not_null(self) -> Expr;
    fn paren(self) -> Expr;
}

impl ExprExt for Expr {
    fn binary(self, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self))
    }
}
