//! Abstract Syntax Tree (AST) definitions
//!
//! This module defines the structure of parsed statements.

use crate::storage::Value;
use std::fmt;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE DATABASE <name>
    CreateDatabase(String),
    /// CREATE TABLE <name> (<col> <type>, ...)
    CreateTable(CreateTableStatement),
    /// DROP DATABASE <name>
    DropDatabase(String),
    /// DROP TABLE <name>
    DropTable(String),
    /// USE <name>
    Use(String),
    /// SHOW DATABASES
    ShowDatabases,
    /// SHOW TABLES
    ShowTables,
    /// DESCRIBE <table>
    Describe(String),
    /// INSERT INTO ...
    Insert(InsertStatement),
    /// SELECT ...
    Select(SelectStatement),
    /// UPDATE ...
    Update(UpdateStatement),
    /// DELETE FROM ...
    Delete(DeleteStatement),
}

impl Statement {
    /// Keyword naming the statement kind, used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateDatabase(_) => "CREATE DATABASE",
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::DropDatabase(_) => "DROP DATABASE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::Use(_) => "USE",
            Statement::ShowDatabases => "SHOW DATABASES",
            Statement::ShowTables => "SHOW TABLES",
            Statement::Describe(_) => "DESCRIBE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
        }
    }
}

// ========== DDL ==========

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub columns: Vec<ColumnSpec>,
}

/// Column name with its unvalidated type spec, e.g. `VARCHAR(10)`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_spec: String,
}

// ========== DML ==========

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    /// Target columns; `None` means every column in declaration order
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Literal>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projection: Projection,
    pub table_name: String,
    pub clause: Clause,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub clause: Clause,
}

/// `column = value` in an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Literal,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub clause: Clause,
}

/// Columns returned by a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*` or `1`: every column in declaration order
    Wildcard,
    Columns(Vec<String>),
}

// ========== Clause ==========

/// WHERE / ORDER BY / LIMIT suffix shared by SELECT, UPDATE and DELETE
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    /// Conditions joined by AND
    pub conditions: Vec<Condition>,
    pub order_by: Option<String>,
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

/// Sort direction for ORDER BY
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// `column <op> literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: ComparisonOp,
    pub literal: Literal,
}

/// Comparison operators allowed in a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Eq => write!(f, "="),
            ComparisonOp::NotEq => write!(f, "!="),
            ComparisonOp::Lt => write!(f, "<"),
            ComparisonOp::Gt => write!(f, ">"),
            ComparisonOp::LtEq => write!(f, "<="),
            ComparisonOp::GtEq => write!(f, ">="),
            ComparisonOp::Like => write!(f, "LIKE"),
        }
    }
}

/// Literal value as written in a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Integer(i64),
    /// Quoted string or bare word
    String(String),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Integer(n) => Value::Integer(n),
            Literal::String(s) => Value::String(s),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_kind() {
        assert_eq!(Statement::ShowTables.kind(), "SHOW TABLES");
        assert_eq!(Statement::Use("shop".to_string()).kind(), "USE");

        let delete = Statement::Delete(DeleteStatement {
            table_name: "user".to_string(),
            clause: Clause::default(),
        });
        assert_eq!(delete.kind(), "DELETE");
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::String("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(Value::from(Literal::Integer(-4)), Value::Integer(-4));
    }
}
