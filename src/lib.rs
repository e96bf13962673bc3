//! sqlstash - an in-memory SQL-subset engine
//!
//! This library provides the core components:
//! - Statement parsing (lexer, parser, AST)
//! - Database catalog and column types
//! - In-memory row storage
//! - Clause evaluation and statement dispatch

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use executor::{QueryResult, Session};
