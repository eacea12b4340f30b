//! SQL Tokens - the atomic units of SQL output.
//!
//! Tokens serialize to one fixed syntax: ANSI double-quoted identifiers
//! and single-quoted string literals, which both the registry store and
//! the remote log store accept.

/// SQL Token - every element a statement in this crate can contain.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    As,
    On,
    Join,
    Inner,
    Left,
    Cross,
    GroupBy,
    IsNull,
    IsNotNull,
    Null,

    // === DDL Keywords ===
    Create,
    Table,
    If,
    Exists,
    Primary,
    Key,
    Autoincrement,

    // === DML Keywords ===
    Insert,
    Into,
    Values,
    Conflict,
    Do,
    Nothing,
    Returning,

    // === Punctuation ===
    Comma,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,

    // === Whitespace / Formatting ===
    Space,
    Newline,

    // === Dynamic Content ===
    /// Simple identifier (table, column, alias)
    Ident(String),
    /// Qualified identifier: qualifier.name
    QualifiedIdent { qualifier: String, name: String },
    /// Integer literal
    LitInt(i64),
    /// String literal
    LitString(String),
    /// Positional bind parameter: ?1, ?2, ...
    Param(usize),
    /// Function name, rendered uppercase as-is
    FunctionName(String),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// Never pass user input here. Only catalog-declared fragments
    /// (presentation expressions, cross-join clauses, fast-view templates)
    /// and placeholder tokens go through this variant.
    Raw(String),
}

impl Token {
    /// Serialize this token to its SQL string.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::As => "AS".into(),
            Token::On => "ON".into(),
            Token::Join => "JOIN".into(),
            Token::Inner => "INNER".into(),
            Token::Left => "LEFT".into(),
            Token::Cross => "CROSS".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::IsNull => "IS NULL".into(),
            Token::IsNotNull => "IS NOT NULL".into(),
            Token::Null => "NULL".into(),

            // DDL keywords
            Token::Create => "CREATE".into(),
            Token::Table => "TABLE".into(),
            Token::If => "IF".into(),
            Token::Exists => "EXISTS".into(),
            Token::Primary => "PRIMARY".into(),
            Token::Key => "KEY".into(),
            Token::Autoincrement => "AUTOINCREMENT".into(),

            // DML keywords
            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Values => "VALUES".into(),
            Token::Conflict => "CONFLICT".into(),
            Token::Do => "DO".into(),
            Token::Nothing => "NOTHING".into(),
            Token::Returning => "RETURNING".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),
            Token::Ne => "<>".into(),
            Token::Lt => "<".into(),
            Token::Gt => ">".into(),
            Token::Lte => "<=".into(),
            Token::Gte => ">=".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),

            // Dynamic content
            Token::Ident(name) => quote_identifier(name),
            Token::QualifiedIdent { qualifier, name } => {
                format!("{}.{}", quote_identifier(qualifier), quote_identifier(name))
            }
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => quote_string(s),
            Token::Param(n) => format!("?{}", n),
            Token::FunctionName(name) => name.to_uppercase(),

            // Escape hatch
            Token::Raw(s) => s.clone(),
        }
    }
}

/// Quote an identifier with double quotes, doubling embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, doubling embedded quotes.
fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(|t| t.serialize()).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
