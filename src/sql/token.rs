//! SQL Token definitions
//!
//! This module defines all tokens that can appear in statements.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // Commands
    Create,
    Drop,
    Use,
    Show,
    Describe,
    Insert,
    Select,
    Update,
    Delete,

    // Objects
    Database,
    Databases,
    Table,
    Tables,

    // Clauses
    Into,
    Values,
    Set,
    From,
    Where,
    And,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Like,
    Null,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// String literal (single- or double-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, bare word)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token starts a statement
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Drop
                | Token::Use
                | Token::Show
                | Token::Describe
                | Token::Insert
                | Token::Select
                | Token::Update
                | Token::Delete
        )
    }

    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "USE" => Some(Token::Use),
            "SHOW" => Some(Token::Show),
            "DESCRIBE" => Some(Token::Describe),
            "INSERT" => Some(Token::Insert),
            "SELECT" => Some(Token::Select),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),

            "DATABASE" => Some(Token::Database),
            "DATABASES" => Some(Token::Databases),
            "TABLE" => Some(Token::Table),
            "TABLES" => Some(Token::Tables),

            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "AND" => Some(Token::And),
            "ORDER" => Some(Token::Order),
            "BY" => Some(Token::By),
            "ASC" => Some(Token::Asc),
            "DESC" => Some(Token::Desc),
            "LIMIT" => Some(Token::Limit),
            "LIKE" => Some(Token::Like),
            "NULL" => Some(Token::Null),

            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Create => write!(f, "CREATE"),
            Token::Drop => write!(f, "DROP"),
            Token::Use => write!(f, "USE"),
            Token::Show => write!(f, "SHOW"),
            Token::Describe => write!(f, "DESCRIBE"),
            Token::Insert => write!(f, "INSERT"),
            Token::Select => write!(f, "SELECT"),
            Token::Update => write!(f, "UPDATE"),
            Token::Delete => write!(f, "DELETE"),
            Token::Database => write!(f, "DATABASE"),
            Token::Databases => write!(f, "DATABASES"),
            Token::Table => write!(f, "TABLE"),
            Token::Tables => write!(f, "TABLES"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Set => write!(f, "SET"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::And => write!(f, "AND"),
            Token::Order => write!(f, "ORDER"),
            Token::By => write!(f, "BY"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Like => write!(f, "LIKE"),
            Token::Null => write!(f, "NULL"),
            Token::IntegerLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}
