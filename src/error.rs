//! Error types for sqlstash
//!
//! Every failure a statement can produce maps onto one entry of a fixed
//! catalog of error kinds. Each kind has a stable code (see [`Error::code`])
//! and a parameterized message.

use thiserror::Error;

/// The main error type for sqlstash
#[derive(Error, Debug)]
pub enum Error {
    // ========== Statement Errors ==========
    /// Malformed statement. `near` names the offending token for diagnostics
    /// and is deliberately left out of the message.
    #[error("You have an error in your SQL syntax")]
    SyntaxError { near: String },

    #[error("Unknown command")]
    UnknownCommand,

    #[error("Column count doesn't match value count")]
    WrongValueCount,

    // ========== Session Errors ==========
    #[error("No database selected")]
    NoDbSelected,

    #[error("No databases exist")]
    NoDbExist,

    #[error("No tables used")]
    NoTablesUsed,

    // ========== Catalog Errors ==========
    #[error("Unknown database '{0}'")]
    UnknownDb(String),

    #[error("Unknown table '{0}'")]
    UnknownTable(String),

    /// Column name, table name
    #[error("Unknown column '{0}' in '{1}'")]
    UnknownField(String, String),

    #[error("Can't create database {0}")]
    CantCreateDb(String),

    #[error("Can't drop database '{0}'; database doesn't exist")]
    CantDropDb(String),

    #[error("Can't drop table '{0}'")]
    CantDropTable(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    // ========== Import Errors ==========
    #[error("Invalid import: {0}")]
    InvalidImport(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Build a syntax error pointing at the given token text
    pub fn syntax(near: impl Into<String>) -> Self {
        Error::SyntaxError { near: near.into() }
    }

    /// Stable, caller-facing error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::SyntaxError { .. } => "SYNTAX_ERROR",
            Error::UnknownCommand => "UNKNOWN_COM",
            Error::WrongValueCount => "WRONG_VALUE_COUNT",
            Error::NoDbSelected => "NO_DB_SELECTED",
            Error::NoDbExist => "NO_DB_EXIST",
            Error::NoTablesUsed => "NO_TABLES_USED",
            Error::UnknownDb(_) => "UNKNOWN_DB",
            Error::UnknownTable(_) => "UNKNOWN_TABLE",
            Error::UnknownField(_, _) => "UNKNOWN_FIELD",
            Error::CantCreateDb(_) => "CANT_CREATE_DB",
            Error::CantDropDb(_) => "CANT_DROP_DB",
            Error::CantDropTable(_) => "CANT_DROP_TABLE",
            Error::TableExists(_) => "TABLE_EXISTS",
            Error::InvalidImport(_) => "INVALID_IMPORT",
            Error::IoError(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for sqlstash operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTable("users".to_string());
        assert_eq!(err.to_string(), "Unknown table 'users'");

        let err = Error::UnknownField("age".to_string(), "users".to_string());
        assert_eq!(err.to_string(), "Unknown column 'age' in 'users'");

        let err = Error::CantDropDb("shop".to_string());
        assert_eq!(
            err.to_string(),
            "Can't drop database 'shop'; database doesn't exist"
        );
    }

    #[test]
    fn test_syntax_error_hides_token() {
        let err = Error::syntax("FORM");
        assert_eq!(err.to_string(), "You have an error in your SQL syntax");
        assert_eq!(err.code(), "SYNTAX_ERROR");
        assert!(matches!(err, Error::SyntaxError { ref near } if near == "FORM"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UnknownCommand.code(), "UNKNOWN_COM");
        assert_eq!(Error::NoDbSelected.code(), "NO_DB_SELECTED");
        assert_eq!(Error::TableExists("t".into()).code(), "TABLE_EXISTS");
        assert_eq!(Error::WrongValueCount.code(), "WRONG_VALUE_COUNT");
    }
}
