//! SQL module
//!
//! This module contains the lexer, tokens, AST and parser for the statement
//! language.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use lexer::Lexer;
pub use parser::{split_statements, Parser};
pub use token::Token;

use crate::error::Result;

/// Parse one statement string into a [`Statement`]
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql.trim())?.parse()
}
