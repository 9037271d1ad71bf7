//! Token types for the SQL lexer.

use super::Span;

/// SQL keywords.
///
/// Type names are deliberately absent: they are plain words whose meaning is
/// decided by the active dialect's type resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Data Query Language (DQL)
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Having,
    Limit,
    Offset,
    Distinct,
    All,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    On,
    Using,

    // Set operations
    Union,
    Intersect,
    Except,

    // Data Manipulation Language (DML)
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Returning,

    // Data Definition Language (DDL)
    Create,
    Drop,
    Alter,
    Table,
    Index,
    View,
    Add,
    Column,
    Rename,
    To,
    After,
    Modify,
    Change,
    Type,

    // Constraints
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Check,
    Default,
    Constraint,
    Cascade,
    Restrict,
    Collate,
    Autoincrement,

    // Logical operators
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Glob,
    Escape,
    Is,
    Null,
    True,
    False,
    Exists,

    // Ordering
    Asc,
    Desc,
    Nulls,
    First,
    Last,

    // Upsert and conflict handling
    If,
    Temporary,
    Temp,
    Conflict,
    Replace,
    Do,
    Nothing,

    // Common clauses
    As,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Window functions
    Over,
    Partition,
    Rows,
    Range,
    Unbounded,
    Preceding,
    Following,
    Current,
    Row,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Select,
        Self::From,
        Self::Where,
        Self::Order,
        Self::By,
        Self::Group,
        Self::Having,
        Self::Limit,
        Self::Offset,
        Self::Distinct,
        Self::All,
        Self::Join,
        Self::Inner,
        Self::Left,
        Self::Right,
        Self::Full,
        Self::Outer,
        Self::Cross,
        Self::On,
        Self::Using,
        Self::Union,
        Self::Intersect,
        Self::Except,
        Self::Insert,
        Self::Into,
        Self::Values,
        Self::Update,
        Self::Set,
        Self::Delete,
        Self::Returning,
        Self::Create,
        Self::Drop,
        Self::Alter,
        Self::Table,
        Self::Index,
        Self::View,
        Self::Add,
        Self::Column,
        Self::Rename,
        Self::To,
        Self::After,
        Self::Modify,
        Self::Change,
        Self::Type,
        Self::Primary,
        Self::Key,
        Self::Foreign,
        Self::References,
        Self::Unique,
        Self::Check,
        Self::Default,
        Self::Constraint,
        Self::Cascade,
        Self::Restrict,
        Self::Collate,
        Self::Autoincrement,
        Self::And,
        Self::Or,
        Self::Not,
        Self::In,
        Self::Between,
        Self::Like,
        Self::Glob,
        Self::Escape,
        Self::Is,
        Self::Null,
        Self::True,
        Self::False,
        Self::Exists,
        Self::Asc,
        Self::Desc,
        Self::Nulls,
        Self::First,
        Self::Last,
        Self::If,
        Self::Temporary,
        Self::Temp,
        Self::Conflict,
        Self::Replace,
        Self::Do,
        Self::Nothing,
        Self::As,
        Self::Case,
        Self::When,
        Self::Then,
        Self::Else,
        Self::End,
        Self::Cast,
        Self::Over,
        Self::Partition,
        Self::Rows,
        Self::Range,
        Self::Unbounded,
        Self::Preceding,
        Self::Following,
        Self::Current,
        Self::Row,
    ];

    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns true if the keyword can never be used as a bare identifier.
    ///
    /// Non-reserved keywords (`KEY`, `FIRST`, `TYPE`, ...) only carry meaning
    /// in specific positions and are accepted as column or table names
    /// everywhere else.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        !matches!(
            self,
            Self::Key
                | Self::Cascade
                | Self::Restrict
                | Self::Autoincrement
                | Self::Add
                | Self::Column
                | Self::Rename
                | Self::To
                | Self::After
                | Self::Modify
                | Self::Change
                | Self::Type
                | Self::Glob
                | Self::Escape
                | Self::Asc
                | Self::Desc
                | Self::Nulls
                | Self::First
                | Self::Last
                | Self::If
                | Self::Temporary
                | Self::Temp
                | Self::Conflict
                | Self::Replace
                | Self::Do
                | Self::Nothing
                | Self::Over
                | Self::Partition
                | Self::Rows
                | Self::Range
                | Self::Unbounded
                | Self::Preceding
                | Self::Following
                | Self::Current
                | Self::Row
        )
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::On => "ON",
            Self::Using => "USING",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Returning => "RETURNING",
            Self::Create => "CREATE",
            Self::Drop => "DROP",
            Self::Alter => "ALTER",
            Self::Table => "TABLE",
            Self::Index => "INDEX",
            Self::View => "VIEW",
            Self::Add => "ADD",
            Self::Column => "COLUMN",
            Self::Rename => "RENAME",
            Self::To => "TO",
            Self::After => "AFTER",
            Self::Modify => "MODIFY",
            Self::Change => "CHANGE",
            Self::Type => "TYPE",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Foreign => "FOREIGN",
            Self::References => "REFERENCES",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
            Self::Default => "DEFAULT",
            Self::Constraint => "CONSTRAINT",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::Collate => "COLLATE",
            Self::Autoincrement => "AUTOINCREMENT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Glob => "GLOB",
            Self::Escape => "ESCAPE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Exists => "EXISTS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Nulls => "NULLS",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::If => "IF",
            Self::Temporary => "TEMPORARY",
            Self::Temp => "TEMP",
            Self::Conflict => "CONFLICT",
            Self::Replace => "REPLACE",
            Self::Do => "DO",
            Self::Nothing => "NOTHING",
            Self::As => "AS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::Over => "OVER",
            Self::Partition => "PARTITION",
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
            Self::Unbounded => "UNBOUNDED",
            Self::Preceding => "PRECEDING",
            Self::Following => "FOLLOWING",
            Self::Current => "CURRENT",
            Self::Row => "ROW",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal (e.g., 'hello')
    String(String),
    /// Blob literal (e.g., X'1234')
    Blob(Vec<u8>),

    // Identifiers and keywords
    /// Identifier (e.g., column_name). Quoted identifiers never become keywords.
    Identifier(String),
    /// SQL keyword
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// ->
    Arrow,
    /// ->>
    LongArrow,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// :
    Colon,
    /// ::
    DoubleColon,
    /// ?
    Question,
    /// @
    At,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("ReTuRnInG"), Some(Keyword::Returning));
        assert_eq!(Keyword::from_str("not_a_keyword"), None);
    }

    #[test]
    fn test_type_names_are_not_keywords() {
        for word in ["INTEGER", "TEXT", "TINYINT", "BOOLEAN", "VARCHAR"] {
            assert_eq!(Keyword::from_str(word), None, "{word}");
        }
    }

    #[test]
    fn test_every_keyword_round_trips() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(*kw));
        }
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(Keyword::Select.is_reserved());
        assert!(Keyword::Returning.is_reserved());
        assert!(!Keyword::Key.is_reserved());
        assert!(!Keyword::First.is_reserved());
        assert!(!Keyword::Type.is_reserved());
    }

    #[test]
    fn test_token_as_keyword() {
        let select = Token::new(TokenKind::Keyword(Keyword::Select), Span::new(0, 6));
        let plus = Token::new(TokenKind::Plus, Span::new(0, 1));
        assert_eq!(select.as_keyword(), Some(Keyword::Select));
        assert_eq!(plus.as_keyword(), None);
        assert!(!select.is_eof());
    }
}
