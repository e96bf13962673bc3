//! Catalog module
//!
//! This module contains the database catalog, table schemas, and column types.

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::{is_valid_name, Catalog, Database};
pub use schema::{Column, Schema};
pub use types::{ColumnKind, ColumnType};
